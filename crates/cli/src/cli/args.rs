// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Arguments for `floorsync submit`.

use clap::{Args, ValueEnum};
use fls_core::CardAction;

use super::non_empty_string;
use crate::error::{Error, Result};

/// Card action selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ActionKind {
    Start,
    Pause,
    Complete,
    Problem,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Start => "start",
            ActionKind::Pause => "pause",
            ActionKind::Complete => "complete",
            ActionKind::Problem => "problem",
        }
    }
}

#[derive(Args, Clone, Debug)]
pub struct SubmitArgs {
    /// Action to perform
    #[arg(value_enum)]
    pub kind: ActionKind,

    /// Production card id
    #[arg(long, short, value_parser = non_empty_string)]
    pub card: String,

    /// Step id (required except for problem reports)
    #[arg(long, short, value_parser = non_empty_string)]
    pub step: Option<String>,

    /// Why work is paused
    #[arg(long, short)]
    pub reason: Option<String>,

    /// Quantity produced by the completed step
    #[arg(long, short)]
    pub quantity: Option<u32>,

    /// Problem description
    #[arg(long, short, value_parser = non_empty_string)]
    pub description: Option<String>,
}

impl SubmitArgs {
    /// Build the card action, checking fields the action needs.
    pub fn into_action(self) -> Result<CardAction> {
        let action = self.kind.as_str();
        let step = |step: Option<String>| {
            step.ok_or(Error::FieldRequired {
                field: "--step",
                action,
            })
        };

        Ok(match self.kind {
            ActionKind::Start => CardAction::start(self.card, step(self.step)?),
            ActionKind::Pause => CardAction::pause(self.card, step(self.step)?, self.reason),
            ActionKind::Complete => {
                CardAction::complete(self.card, step(self.step)?, self.quantity)
            }
            ActionKind::Problem => {
                let description = self.description.ok_or(Error::FieldRequired {
                    field: "--description",
                    action,
                })?;
                CardAction::report_problem(self.card, self.step, description)
            }
        })
    }
}
