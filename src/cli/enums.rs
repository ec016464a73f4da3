//! CLI enum types.

use clap::ValueEnum;

use crate::frame::PatternKind;

/// Synthetic frame source layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PatternArg {
    #[default]
    Gradient,
    Bars,
}

impl From<PatternArg> for PatternKind {
    fn from(p: PatternArg) -> Self {
        match p {
            PatternArg::Gradient => PatternKind::Gradient,
            PatternArg::Bars => PatternKind::Bars,
        }
    }
}
