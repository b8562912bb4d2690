//! Prompt templates and prompt assembly.
//!
//! Every field of the request is rendered under a fixed label in a fixed
//! order. Absent optional fields are rendered with an explicit marker instead
//! of being left out, so the model never has to infer absence from layout.

use std::fmt::Write as _;

use plume_core::defaults::MAX_TRANSMITTED_ATTACHMENTS;
use plume_core::{CritiqueRequest, GenerationRequest, Mode, Submission};

/// Marker for an absent optional field.
pub const NONE_MARKER: &str = "无";

/// Marker for an absent draft.
pub const NO_DRAFT_MARKER: &str = "无初始草稿";

/// System instruction for [`Mode::Generate`].
pub const GENERATION_SYSTEM_INSTRUCTION: &str = r##"你是小红书爆款内容专家。你的任务是根据用户提供的产品/品牌信息、配图和营销目的，生成两篇不同策略的爆款种草笔记（策略 A 和策略 B）。

**策略 A (strategyA)**：侧重于用户选择的"营销目的"（例如涨粉或转化），直击痛点，干货满满。
**策略 B (strategyB)**：侧重于用户选择的"语气风格"（例如真诚或情绪），侧重故事感、氛围感或情绪价值。

**文案要求：**
1. **标题**：必须极具吸引力，使用爆款标题公式（悬念、数字、对比、情绪），不超过 20 个字。
2. **正文**：
   - 包含大量 Emoji 表情，排版活泼。
   - 分段清晰，阅读体验好。
   - 口语化，像真人分享。
   - 巧妙植入产品卖点，必须覆盖用户给出的补充要点。
   - 如果用户提供了初始草稿，在草稿基础上改写；否则从零创作。
3. **标签**：生成 3-5 个精准话题标签，每个以 # 开头。

**输出格式（严格 JSON）：**
{
  "strategyA": { "title": "标题A", "body": "正文内容A...", "tags": ["#标签1", "#标签2"] },
  "strategyB": { "title": "标题B", "body": "正文内容B...", "tags": ["#标签1", "#标签2"] }
}"##;

/// System instruction for [`Mode::Critique`].
pub const CRITIQUE_SYSTEM_INSTRUCTION: &str = r##"你是小红书爆款笔记诊断专家。你的任务是对用户提供的笔记标题和正文进行打分、诊断，并给出可以直接使用的优化版本。

**评分维度（总分 100）：**
1. 标题吸引力 titleScore：0-30 分
2. 开篇设计 openingScore：0-25 分
3. 内容结构 structureScore：0-25 分
4. 互动设计 engagementScore：0-20 分
总分 score 必须等于四项之和。

**诊断要求：**
- problems：列出 3-5 个最关键的问题，每条一句话。
- suggestions：每条建议包含 category（title / opening / structure / engagement / emoji 之一）、priority（high / medium / low）、reason（原因）；
  如果是针对原文某一句的修改，给出 original（原文片段）和 rewrites（1-3 个改写方案）；否则给出 note（具体做法）。
- rewrittenFullText：结合创作目的，输出一篇完整的优化后正文，保留原意，增加 Emoji 与互动引导。
- hashtags：推荐 5-8 个话题标签，每个以 # 开头。

**输出格式（严格 JSON）：**
{
  "score": 72,
  "breakdown": { "titleScore": 20, "openingScore": 18, "structureScore": 19, "engagementScore": 15 },
  "problems": ["问题1"],
  "suggestions": [
    { "category": "title", "priority": "high", "original": "原标题", "rewrites": ["改写1"], "reason": "原因" }
  ],
  "rewrittenFullText": "优化后的正文...",
  "hashtags": ["#标签1"]
}"##;

/// Fixed system instruction for `mode`.
pub fn system_instruction(mode: Mode) -> &'static str {
    match mode {
        Mode::Generate => GENERATION_SYSTEM_INSTRUCTION,
        Mode::Critique => CRITIQUE_SYSTEM_INSTRUCTION,
    }
}

/// Build the user prompt for a submission. Pure and deterministic.
pub fn assemble(submission: &Submission) -> String {
    match submission {
        Submission::Generate(request) => assemble_generation(request),
        Submission::Critique(request) => assemble_critique(request),
    }
}

pub fn assemble_generation(request: &GenerationRequest) -> String {
    let transmitted = request.attachments.len().min(MAX_TRANSMITTED_ATTACHMENTS);
    let mut prompt = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(prompt, "**输入信息：**");
    let _ = writeln!(
        prompt,
        "- 品牌背景：{}",
        request.brand_context.as_deref().unwrap_or(NONE_MARKER)
    );
    let _ = writeln!(prompt, "- 营销目的：{}", request.goal.label());
    let _ = writeln!(prompt, "- 语气风格：{}", request.tone.label());
    match request.draft.as_deref() {
        Some(draft) => {
            let _ = writeln!(prompt, "- 是否提供草稿：是");
            let _ = writeln!(prompt, "- 初始草稿：{}", draft);
        }
        None => {
            let _ = writeln!(prompt, "- 是否提供草稿：否");
            let _ = writeln!(prompt, "- 初始草稿：{}", NO_DRAFT_MARKER);
        }
    }
    let _ = writeln!(prompt, "- 补充要点：{}", request.key_points);
    let _ = writeln!(prompt, "- 参考配图：{} 张（见上方图片）", transmitted);
    let _ = writeln!(prompt);
    let _ = write!(
        prompt,
        "请根据系统指令生成策略 A 和策略 B 两篇笔记，并以JSON格式返回。"
    );
    prompt
}

pub fn assemble_critique(request: &CritiqueRequest) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "**输入信息：**");
    let _ = writeln!(prompt, "- 标题：{}", request.title);
    let _ = writeln!(prompt, "- 正文：{}", request.body);
    let _ = writeln!(prompt, "- 创作目的：{}", request.purpose.label());
    let _ = writeln!(prompt);
    let _ = write!(prompt, "请根据系统指令进行详细分析并以JSON格式返回。");
    prompt
}
