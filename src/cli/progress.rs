// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Progress bars for long CLI runs

use crate::repair::RepairProgress;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|style| style.progress_chars("#>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Bar counting processed files
pub fn batch_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(bar_style());
    pb
}

/// Bar driven by repair progress callbacks, in percent
pub struct RepairBar {
    bar: ProgressBar,
}

impl RepairBar {
    pub fn new() -> Self {
        let bar = ProgressBar::new(100);
        bar.set_style(bar_style());
        Self { bar }
    }

    pub fn update(&self, progress: &RepairProgress) {
        self.bar.set_position(progress.percent.round() as u64);
        self.bar.set_message(progress.step.clone());
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl Default for RepairBar {
    fn default() -> Self {
        Self::new()
    }
}
