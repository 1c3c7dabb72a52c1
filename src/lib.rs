//! Fits card text into fixed-size boxes by choosing a font
//! tier and a horizontal condensation ratio, then justifies
//! the lines and records the draw commands.

pub mod canvas;
pub mod condense;
pub mod config;
pub mod font;
pub mod justify;
pub mod layout;
pub mod oracle;
mod rect;
pub mod text;
pub mod tier;

pub use canvas::{paint, Canvas, Command, TransformGuard};
pub use condense::{CondenseSearch, SearchPhase};
pub use config::{presets, ConfigError, LayoutConfig, SegmentStyle, ToleranceTable};
pub use font::{FontBook, FontConfig, FontTier, MalformedFont, SymbolClass};
pub use justify::{LineInstruction, Segment, SegmentInstruction};
pub use layout::{layout, LayoutRequest, LayoutResult, Layouter};
pub use oracle::{GeometryHost, GeometryOracle, MeasurementOracle};
pub use rect::{Rect, Region};
pub use text::{SpecialCharacters, Token, TokenKind};
pub use tier::TierAttempt;
