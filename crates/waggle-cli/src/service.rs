// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use waggle_api::{Client, dashboard_url};
use waggle_app::{Datapoint, DatapointRequest, GoalDetail, GoalSummary};

/// Adapts the blocking API client to the UI's service boundary for one
/// configured user.
pub struct ApiService {
    client: Client,
    username: String,
}

impl ApiService {
    pub fn new(client: Client, username: String) -> Self {
        Self { client, username }
    }
}

impl waggle_tui::GoalService for ApiService {
    fn fetch_goals(&mut self) -> Result<Vec<GoalSummary>> {
        Ok(self.client.goals(&self.username)?)
    }

    fn fetch_goal_detail(&mut self, slug: &str) -> Result<GoalDetail> {
        Ok(self.client.goal(&self.username, slug, false)?)
    }

    fn create_datapoint(&mut self, slug: &str, request: &DatapointRequest) -> Result<Datapoint> {
        Ok(self.client.create_datapoint(&self.username, slug, request)?)
    }

    fn open_dashboard(&mut self) {
        // Best effort: a failed browser launch must not disturb the TUI.
        let _ = open::that_detached(dashboard_url(&self.username));
    }
}

#[cfg(test)]
mod tests {
    use super::ApiService;
    use anyhow::{Result, anyhow};
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};
    use waggle_api::Client;
    use waggle_tui::GoalService;

    #[test]
    fn fetch_goals_goes_through_the_configured_user() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}", server.server_addr());

        let handle = thread::spawn(move || {
            let request = server.recv().expect("request expected");
            assert!(request.url().starts_with("/users/alice/goals.json"));
            let response = Response::from_string(
                r#"[{"slug":"reading","title":"Read","curval":1.0,"goalval":2.0,
                    "rate":null,"losedate":null,"updated_at":null,
                    "lost":false,"won":false,"frozen":false}]"#,
            )
            .with_status_code(200)
            .with_header(
                Header::from_bytes("Content-Type", "application/json")
                    .expect("valid content type header"),
            );
            request.respond(response).expect("response should succeed");
        });

        let client = Client::new(&base_url, "token", Duration::from_secs(1))?;
        let mut service = ApiService::new(client, "alice".to_owned());
        let goals = service.fetch_goals()?;
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].slug, "reading");

        handle.join().expect("server thread should join");
        Ok(())
    }

    #[test]
    fn api_errors_surface_through_the_service_boundary() -> Result<()> {
        let client = Client::new("http://127.0.0.1:1", "token", Duration::from_millis(50))?;
        let mut service = ApiService::new(client, "alice".to_owned());
        let error = service
            .fetch_goals()
            .expect_err("unreachable host should fail");
        assert!(error.to_string().contains("cannot reach"));
        Ok(())
    }
}
