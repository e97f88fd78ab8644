// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI subsystem for meshdoctor

pub mod progress;
pub mod reporter;

pub use progress::{batch_bar, RepairBar};
pub use reporter::Reporter;
