// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod format;
pub mod model;
pub mod state;

pub use format::*;
pub use model::*;
pub use state::*;
