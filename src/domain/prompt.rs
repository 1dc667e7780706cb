//! Click and box prompts.
//!
//! All coordinates are in original image pixels; rescaling to the model's
//! 1024-pixel frame happens when the prompt tensors are packed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::errors::SamError;

/// Whether a click marks foreground or background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClickType {
    /// Background point, label `0`.
    Negative,
    /// Foreground point, label `1`.
    Positive,
}

impl ClickType {
    /// Returns the point label fed to the decoder.
    pub fn label(self) -> f32 {
        match self {
            ClickType::Negative => 0.0,
            ClickType::Positive => 1.0,
        }
    }
}

impl FromStr for ClickType {
    type Err = SamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "+" | "pos" | "positive" => Ok(ClickType::Positive),
            "0" | "-" | "neg" | "negative" => Ok(ClickType::Negative),
            other => Err(SamError::invalid_input(format!(
                "unknown click type '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ClickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClickType::Negative => write!(f, "negative"),
            ClickType::Positive => write!(f, "positive"),
        }
    }
}

/// A single click on the image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Click {
    pub x: f32,
    pub y: f32,
    pub click_type: ClickType,
}

impl Click {
    pub fn new(x: f32, y: f32, click_type: ClickType) -> Self {
        Self { x, y, click_type }
    }

    pub fn positive(x: f32, y: f32) -> Self {
        Self::new(x, y, ClickType::Positive)
    }

    pub fn negative(x: f32, y: f32) -> Self {
        Self::new(x, y, ClickType::Negative)
    }
}

fn parse_coords(s: &str, expected: usize, what: &str) -> Result<Vec<f32>, SamError> {
    let values = s
        .split(',')
        .map(|part| {
            part.trim().parse::<f32>().map_err(|_| {
                SamError::invalid_input(format!("invalid {} coordinate '{}'", what, part.trim()))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    if values.len() != expected || values.iter().any(|v| !v.is_finite()) {
        return Err(SamError::invalid_input(format!(
            "expected {} finite comma-separated values for {}, got '{}'",
            expected, what, s
        )));
    }
    Ok(values)
}

/// Parses `x,y` (positive click) or `x,y,label`.
impl FromStr for Click {
    type Err = SamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(',') {
            Some((coords, label)) if coords.contains(',') => {
                let xy = parse_coords(coords, 2, "click")?;
                Ok(Click::new(xy[0], xy[1], label.parse()?))
            }
            _ => {
                let xy = parse_coords(s, 2, "click")?;
                Ok(Click::positive(xy[0], xy[1]))
            }
        }
    }
}

/// A box prompt, stored with `(x0, y0)` as the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPrompt {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoxPrompt {
    /// Creates a box from any two opposite corners.
    pub fn new(xa: f32, ya: f32, xb: f32, yb: f32) -> Self {
        Self {
            x0: xa.min(xb),
            y0: ya.min(yb),
            x1: xa.max(xb),
            y1: ya.max(yb),
        }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// Parses `x0,y0,x1,y1`.
impl FromStr for BoxPrompt {
    type Err = SamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let v = parse_coords(s, 4, "box")?;
        Ok(BoxPrompt::new(v[0], v[1], v[2], v[3]))
    }
}

/// The full set of prompts for one decoder run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PromptSet {
    pub clicks: Vec<Click>,
    pub box_prompt: Option<BoxPrompt>,
}

impl PromptSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_clicks(clicks: impl IntoIterator<Item = Click>) -> Self {
        Self {
            clicks: clicks.into_iter().collect(),
            box_prompt: None,
        }
    }

    pub fn with_box(mut self, box_prompt: BoxPrompt) -> Self {
        self.box_prompt = Some(box_prompt);
        self
    }

    pub fn push(&mut self, click: Click) {
        self.clicks.push(click);
    }

    /// Removes the most recent click.
    pub fn pop(&mut self) -> Option<Click> {
        self.clicks.pop()
    }

    pub fn clear(&mut self) {
        self.clicks.clear();
        self.box_prompt = None;
    }

    /// True when there is nothing to decode.
    pub fn is_empty(&self) -> bool {
        self.clicks.is_empty() && self.box_prompt.is_none()
    }

    /// Number of points the decoder will receive, including box corners or
    /// the padding point.
    pub fn point_count(&self) -> usize {
        if self.is_empty() {
            0
        } else if self.box_prompt.is_some() {
            self.clicks.len() + 2
        } else {
            self.clicks.len() + 1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_type_labels() {
        assert_eq!(ClickType::Positive.label(), 1.0);
        assert_eq!(ClickType::Negative.label(), 0.0);
        assert_eq!("pos".parse::<ClickType>().unwrap(), ClickType::Positive);
        assert_eq!("0".parse::<ClickType>().unwrap(), ClickType::Negative);
        assert!("maybe".parse::<ClickType>().is_err());
    }

    #[test]
    fn test_parse_click() {
        assert_eq!("10,20".parse::<Click>().unwrap(), Click::positive(10.0, 20.0));
        assert_eq!(
            "10.5, 20 , neg".parse::<Click>().unwrap(),
            Click::negative(10.5, 20.0)
        );
        assert!("10".parse::<Click>().is_err());
        assert!("a,b".parse::<Click>().is_err());
        assert!("1,2,3,4".parse::<Click>().is_err());
    }

    #[test]
    fn test_box_normalizes_corners() {
        let b: BoxPrompt = "100,80,20,10".parse().unwrap();
        assert_eq!(b, BoxPrompt::new(20.0, 10.0, 100.0, 80.0));
        assert_eq!(b.width(), 80.0);
        assert_eq!(b.height(), 70.0);
        assert!("1,2,3".parse::<BoxPrompt>().is_err());
    }

    #[test]
    fn test_prompt_set_point_count() {
        let mut prompts = PromptSet::new();
        assert!(prompts.is_empty());
        assert_eq!(prompts.point_count(), 0);

        prompts.push(Click::positive(1.0, 2.0));
        prompts.push(Click::negative(3.0, 4.0));
        assert_eq!(prompts.point_count(), 3);

        let boxed = prompts.clone().with_box(BoxPrompt::new(0.0, 0.0, 5.0, 5.0));
        assert_eq!(boxed.point_count(), 4);

        assert_eq!(prompts.pop(), Some(Click::negative(3.0, 4.0)));
        prompts.clear();
        assert!(prompts.is_empty());

        let box_only = PromptSet::new().with_box(BoxPrompt::new(0.0, 0.0, 5.0, 5.0));
        assert!(!box_only.is_empty());
        assert_eq!(box_only.point_count(), 2);
    }
}
