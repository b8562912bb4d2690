//! Core data models for plume.
//!
//! Requests flow in as [`GenerationRequest`] / [`CritiqueRequest`] (wrapped in
//! a [`Submission`]), results flow out as [`GenerationResult`] /
//! [`CritiqueResult`]. Result types serialize to exactly the JSON shape the
//! backend is asked to produce.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::defaults;

// =============================================================================
// MODES AND OPTIONS
// =============================================================================

/// Which workflow a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Produce two alternative marketing notes.
    Generate,
    /// Score and rewrite an existing note.
    Critique,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate => write!(f, "generate"),
            Self::Critique => write!(f, "critique"),
        }
    }
}

/// An option string that matched none of the known values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownOption {
    pub kind: &'static str,
    pub value: String,
}

/// Marketing goal of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    Growth,
    Sales,
    Traffic,
    BrandExposure,
}

impl Goal {
    pub const ALL: [Goal; 4] = [Goal::Growth, Goal::Sales, Goal::Traffic, Goal::BrandExposure];

    /// Label used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Growth => "涨粉种草",
            Self::Sales => "电商转化",
            Self::Traffic => "引流私域",
            Self::BrandExposure => "品牌曝光",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Sales => "sales",
            Self::Traffic => "traffic",
            Self::BrandExposure => "brand-exposure",
        }
    }
}

impl FromStr for Goal {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "growth" => Ok(Self::Growth),
            "sales" => Ok(Self::Sales),
            "traffic" => Ok(Self::Traffic),
            "brand-exposure" | "brand_exposure" | "brand" => Ok(Self::BrandExposure),
            _ => Err(UnknownOption {
                kind: "goal",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voice of a generation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tone {
    Authentic,
    Emotional,
    Professional,
    Humorous,
    Minimal,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Authentic,
        Tone::Emotional,
        Tone::Professional,
        Tone::Humorous,
        Tone::Minimal,
    ];

    /// Label used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Authentic => "真诚分享",
            Self::Emotional => "情绪共鸣",
            Self::Professional => "专业干货",
            Self::Humorous => "幽默搞怪",
            Self::Minimal => "高冷极简",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentic => "authentic",
            Self::Emotional => "emotional",
            Self::Professional => "professional",
            Self::Humorous => "humorous",
            Self::Minimal => "minimal",
        }
    }
}

impl FromStr for Tone {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "authentic" => Ok(Self::Authentic),
            "emotional" => Ok(Self::Emotional),
            "professional" | "pro" => Ok(Self::Professional),
            "humorous" | "funny" => Ok(Self::Humorous),
            "minimal" => Ok(Self::Minimal),
            _ => Err(UnknownOption {
                kind: "tone",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purpose of the note being critiqued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Purpose {
    Growth,
    Conversion,
    PersonalBrand,
}

impl Purpose {
    pub const ALL: [Purpose; 3] = [Purpose::Growth, Purpose::Conversion, Purpose::PersonalBrand];

    /// Label used inside prompts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Growth => "涨粉引流",
            Self::Conversion => "商品转化",
            Self::PersonalBrand => "打造个人IP",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Growth => "growth",
            Self::Conversion => "conversion",
            Self::PersonalBrand => "personal-brand",
        }
    }
}

impl FromStr for Purpose {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "growth" => Ok(Self::Growth),
            "conversion" => Ok(Self::Conversion),
            "personal-brand" | "personal_brand" | "ip" => Ok(Self::PersonalBrand),
            _ => Err(UnknownOption {
                kind: "purpose",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// ATTACHMENTS
// =============================================================================

/// Where an attachment's bytes live.
pub enum AttachmentSource {
    /// Bytes already loaded in memory.
    Bytes(Vec<u8>),
    /// A file read when the attachment is encoded.
    Path(PathBuf),
}

impl fmt::Debug for AttachmentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(data) => write!(f, "Bytes({} bytes)", data.len()),
            Self::Path(path) => write!(f, "Path({})", path.display()),
        }
    }
}

/// A user-supplied image owned by exactly one request.
///
/// Not `Clone`: the request that holds it is its only owner, and dropping the
/// request drops the bytes.
#[derive(Debug)]
pub struct Attachment {
    /// Display name (file name or caller label).
    pub name: String,
    /// Declared media type, e.g. `image/png`. Empty means "sniff it".
    pub media_type: String,
    pub source: AttachmentSource,
}

impl Attachment {
    pub fn from_bytes(
        name: impl Into<String>,
        media_type: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            source: AttachmentSource::Bytes(data),
        }
    }

    /// Reference a file on disk; the media type is guessed from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = media_type_for_extension(&path).unwrap_or_default().to_string();
        Self {
            name,
            media_type,
            source: AttachmentSource::Path(path),
        }
    }
}

fn media_type_for_extension(path: &std::path::Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Input for [`Mode::Generate`].
#[derive(Debug)]
pub struct GenerationRequest {
    /// Brand or company background applied to every generation.
    pub brand_context: Option<String>,
    pub goal: Goal,
    pub tone: Tone,
    /// Existing draft to build on.
    pub draft: Option<String>,
    /// Selling points the copy must mention. Required.
    pub key_points: String,
    /// Up to [`defaults::MAX_ATTACHMENTS`] images, in upload order.
    pub attachments: Vec<Attachment>,
}

impl GenerationRequest {
    pub fn new(goal: Goal, tone: Tone, key_points: impl Into<String>) -> Self {
        Self {
            brand_context: None,
            goal,
            tone,
            draft: None,
            key_points: key_points.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_brand_context(mut self, brand_context: impl Into<String>) -> Self {
        self.brand_context = Some(brand_context.into());
        self
    }

    pub fn with_draft(mut self, draft: impl Into<String>) -> Self {
        self.draft = Some(draft.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_attachments(mut self, attachments: impl IntoIterator<Item = Attachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }
}

/// Input for [`Mode::Critique`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CritiqueRequest {
    /// At most [`defaults::TITLE_LIMIT`] code points.
    pub title: String,
    /// At most [`defaults::BODY_LIMIT`] code points.
    pub body: String,
    pub purpose: Purpose,
}

impl CritiqueRequest {
    pub fn new(title: impl Into<String>, body: impl Into<String>, purpose: Purpose) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            purpose,
        }
    }
}

/// A request tagged with its mode.
#[derive(Debug)]
pub enum Submission {
    Generate(GenerationRequest),
    Critique(CritiqueRequest),
}

impl Submission {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Generate(_) => Mode::Generate,
            Self::Critique(_) => Mode::Critique,
        }
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// One generated note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteContent {
    pub title: String,
    pub body: String,
    pub tags: Vec<String>,
}

/// Output of [`Mode::Generate`]: two notes written with different strategies.
///
/// Strategy A leans on the chosen goal, strategy B on the chosen tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub strategy_a: NoteContent,
    pub strategy_b: NoteContent,
}

/// Per-dimension critique scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    /// 0..=30
    pub title_score: u32,
    /// 0..=25
    pub opening_score: u32,
    /// 0..=25
    pub structure_score: u32,
    /// 0..=20
    pub engagement_score: u32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u32 {
        self.title_score + self.opening_score + self.structure_score + self.engagement_score
    }
}

/// Area of the note a suggestion targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Title,
    Opening,
    Structure,
    Engagement,
    Emoji,
}

impl SuggestionCategory {
    pub const ALL: [SuggestionCategory; 5] = [
        SuggestionCategory::Title,
        SuggestionCategory::Opening,
        SuggestionCategory::Structure,
        SuggestionCategory::Engagement,
        SuggestionCategory::Emoji,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Opening => "opening",
            Self::Structure => "structure",
            Self::Engagement => "engagement",
            Self::Emoji => "emoji",
        }
    }
}

impl FromStr for SuggestionCategory {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownOption {
                kind: "category",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for Priority {
    type Err = UnknownOption;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownOption {
                kind: "priority",
                value: s.to_string(),
            })
    }
}

/// One improvement suggestion from a critique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionItem {
    pub category: SuggestionCategory,
    pub priority: Priority,
    /// Excerpt of the original text the suggestion refers to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original: Option<String>,
    /// Concrete replacement candidates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rewrites: Option<Vec<String>>,
    /// Free-form advice when no rewrite applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub reason: String,
}

impl SuggestionItem {
    /// Whether the item carries any prescriptive content.
    pub fn is_actionable(&self) -> bool {
        let has_rewrites = self.rewrites.as_ref().is_some_and(|r| !r.is_empty());
        let has_note = self.note.as_ref().is_some_and(|n| !n.trim().is_empty());
        has_rewrites || has_note
    }
}

/// Output of [`Mode::Critique`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CritiqueResult {
    /// 0..=100
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    pub problems: Vec<String>,
    pub suggestions: Vec<SuggestionItem>,
    pub rewritten_full_text: String,
    pub hashtags: Vec<String>,
}

impl CritiqueResult {
    /// Whether the breakdown adds up to the overall score.
    ///
    /// Advisory only; model output is not held to it.
    pub fn is_consistent(&self) -> bool {
        self.breakdown.total() == self.score
    }

    pub fn tier(&self) -> ScoreTier {
        ScoreTier::from_score(self.score)
    }
}

/// A parsed result tagged with its mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedResult {
    Generation(GenerationResult),
    Critique(CritiqueResult),
}

impl ParsedResult {
    pub fn mode(&self) -> Mode {
        match self {
            Self::Generation(_) => Mode::Generate,
            Self::Critique(_) => Mode::Critique,
        }
    }
}

/// Display tier of a critique score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScoreTier {
    Excellent,
    Promising,
    NeedsWork,
}

impl ScoreTier {
    pub fn from_score(score: u32) -> Self {
        if score >= defaults::SCORE_TIER_EXCELLENT {
            Self::Excellent
        } else if score >= defaults::SCORE_TIER_PROMISING {
            Self::Promising
        } else {
            Self::NeedsWork
        }
    }

    /// One-line verdict shown next to the score.
    pub fn verdict(&self) -> &'static str {
        match self {
            Self::Excellent => "太棒了！这篇笔记很有爆款潜质！",
            Self::Promising => "还不错，优化一下更有机会！",
            Self::NeedsWork => "内容还有较大提升空间，加油！",
        }
    }
}
