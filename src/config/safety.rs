use serde::Deserialize;
use tracing::{debug, warn};

/// Harm categories, in the order the config file lists their thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarmCategory {
    Harassment,
    HateSpeech,
    SexuallyExplicit,
    DangerousContent,
}

impl HarmCategory {
    pub const ALL: [HarmCategory; 4] = [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
        HarmCategory::DangerousContent,
    ];

    pub fn api_name(&self) -> &'static str {
        match self {
            HarmCategory::Harassment => "HARM_CATEGORY_HARASSMENT",
            HarmCategory::HateSpeech => "HARM_CATEGORY_HATE_SPEECH",
            HarmCategory::SexuallyExplicit => "HARM_CATEGORY_SEXUALLY_EXPLICIT",
            HarmCategory::DangerousContent => "HARM_CATEGORY_DANGEROUS_CONTENT",
        }
    }
}

/// Blocking threshold for one harm category. The discriminant is the ordinal
/// the API uses for `HarmBlockThreshold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum SafetyThreshold {
    Unspecified = 0,
    LowAndAbove = 1,
    #[default]
    MediumAndAbove = 2,
    OnlyHigh = 3,
    BlockNone = 4,
}

impl SafetyThreshold {
    /// Parses either the legacy client spelling or the API spelling.
    /// Matching is case-sensitive.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "HarmBlockUnspecified" | "HARM_BLOCK_THRESHOLD_UNSPECIFIED" => {
                Some(SafetyThreshold::Unspecified)
            }
            "HarmBlockLowAndAbove" | "BLOCK_LOW_AND_ABOVE" => Some(SafetyThreshold::LowAndAbove),
            "HarmBlockMediumAndAbove" | "BLOCK_MEDIUM_AND_ABOVE" => {
                Some(SafetyThreshold::MediumAndAbove)
            }
            "HarmBlockOnlyHigh" | "BLOCK_ONLY_HIGH" => Some(SafetyThreshold::OnlyHigh),
            "HarmBlockNone" | "BLOCK_NONE" => Some(SafetyThreshold::BlockNone),
            _ => None,
        }
    }

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    pub fn api_name(&self) -> &'static str {
        match self {
            SafetyThreshold::Unspecified => "HARM_BLOCK_THRESHOLD_UNSPECIFIED",
            SafetyThreshold::LowAndAbove => "BLOCK_LOW_AND_ABOVE",
            SafetyThreshold::MediumAndAbove => "BLOCK_MEDIUM_AND_ABOVE",
            SafetyThreshold::OnlyHigh => "BLOCK_ONLY_HIGH",
            SafetyThreshold::BlockNone => "BLOCK_NONE",
        }
    }
}

/// One entry of the `SAFETY_SETTINGS` array.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SafetySettingEntry {
    #[serde(default)]
    pub threshold: String,
}

/// Resolves the configured entries into one threshold per category.
///
/// Entries map to categories by position. Unknown labels and missing entries
/// keep `MediumAndAbove`; entries past the fourth are ignored.
pub fn resolve_thresholds(entries: &[SafetySettingEntry]) -> [SafetyThreshold; 4] {
    let mut thresholds = [SafetyThreshold::default(); 4];

    if entries.len() > thresholds.len() {
        warn!(
            "{} safety settings configured, only the first {} are used",
            entries.len(),
            thresholds.len()
        );
    }

    for (slot, entry) in thresholds.iter_mut().zip(entries) {
        match SafetyThreshold::from_label(&entry.threshold) {
            Some(threshold) => *slot = threshold,
            None => warn!(
                label = %entry.threshold,
                "Unknown safety threshold, keeping {}",
                slot.api_name()
            ),
        }
    }

    debug!(ordinals = ?thresholds.map(|t| t.ordinal()), "Resolved safety thresholds");
    thresholds
}
