use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Blood pressure category based on AHA guidelines
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ReadingCategory {
    /// Normal blood pressure (systolic < 120 and diastolic < 80)
    Normal,

    /// Elevated blood pressure (systolic 120-129 and diastolic < 80)
    Elevated,

    /// Hypertension Stage 1 (systolic 130-139 or diastolic 80-89)
    #[serde(rename = "Stage 1")]
    Stage1,

    /// Hypertension Stage 2 (systolic >= 140 or diastolic >= 90)
    #[serde(rename = "Stage 2")]
    Stage2,

    /// Hypertensive crisis (systolic >= 180 or diastolic >= 120)
    Crisis,
}

/// Static descriptive metadata for a blood pressure category
#[derive(Debug, Clone, Copy, Serialize)]
pub struct CategoryInfo {
    /// Display name for the category
    pub name: &'static str,

    /// Numeric range description
    pub description: &'static str,

    /// Severity color tag for display
    pub color: &'static str,

    /// Recommendation text
    pub recommendation: &'static str,
}

impl ReadingCategory {
    /// The fixed label used in storage and API responses
    pub fn label(&self) -> &'static str {
        match self {
            ReadingCategory::Normal => "Normal",
            ReadingCategory::Elevated => "Elevated",
            ReadingCategory::Stage1 => "Stage 1",
            ReadingCategory::Stage2 => "Stage 2",
            ReadingCategory::Crisis => "Crisis",
        }
    }

    /// Detailed information about the category, suitable for display verbatim
    pub fn info(&self) -> &'static CategoryInfo {
        match self {
            ReadingCategory::Normal => &CategoryInfo {
                name: "Normal",
                description: "Less than 120/80 mmHg",
                color: "green",
                recommendation: "Maintain healthy lifestyle",
            },
            ReadingCategory::Elevated => &CategoryInfo {
                name: "Elevated",
                description: "120-129 systolic and less than 80 diastolic",
                color: "yellow",
                recommendation: "Focus on lifestyle changes",
            },
            ReadingCategory::Stage1 => &CategoryInfo {
                name: "High Blood Pressure Stage 1",
                description: "130-139/80-89 mmHg",
                color: "orange",
                recommendation: "Lifestyle changes and possibly medication",
            },
            ReadingCategory::Stage2 => &CategoryInfo {
                name: "High Blood Pressure Stage 2",
                description: "140/90 mmHg or higher",
                color: "red",
                recommendation: "Lifestyle changes and medication",
            },
            ReadingCategory::Crisis => &CategoryInfo {
                name: "Hypertensive Crisis",
                description: "Higher than 180/120 mmHg",
                color: "darkred",
                recommendation: "Seek immediate medical attention",
            },
        }
    }

    /// Whether the category indicates high risk (Stage 2 or Crisis)
    pub fn is_high_risk(&self) -> bool {
        matches!(self, ReadingCategory::Stage2 | ReadingCategory::Crisis)
    }
}

impl fmt::Display for ReadingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ReadingCategory {
    type Err = String;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "Normal" => Ok(ReadingCategory::Normal),
            "Elevated" => Ok(ReadingCategory::Elevated),
            "Stage 1" => Ok(ReadingCategory::Stage1),
            "Stage 2" => Ok(ReadingCategory::Stage2),
            "Crisis" => Ok(ReadingCategory::Crisis),
            other => Err(format!("Unknown blood pressure category: {}", other)),
        }
    }
}
