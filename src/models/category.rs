//! 评分维度
//!
//! 十个固定的评估维度，顺序即报告中的展示顺序。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 评分维度枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RubricCategory {
    #[serde(rename = "Final product weighting")]
    FinalProductWeighting,
    #[serde(rename = "Iterative documentation")]
    IterativeDocumentation,
    #[serde(rename = "Contextual specificity")]
    ContextualSpecificity,
    #[serde(rename = "Reflective criticality")]
    ReflectiveCriticality,
    #[serde(rename = "Temporal friction")]
    TemporalFriction,
    #[serde(rename = "Multimodal evidence")]
    MultimodalEvidence,
    #[serde(rename = "Explicit AI interrogation")]
    ExplicitAiInterrogation,
    #[serde(rename = "Real-time defence")]
    RealTimeDefence,
    #[serde(rename = "Social and collaborative labour")]
    SocialAndCollaborativeLabour,
    #[serde(rename = "Data recency")]
    DataRecency,
}

/// 小写标签 → 维度
static LABEL_LOOKUP: phf::Map<&'static str, RubricCategory> = phf::phf_map! {
    "final product weighting" => RubricCategory::FinalProductWeighting,
    "iterative documentation" => RubricCategory::IterativeDocumentation,
    "contextual specificity" => RubricCategory::ContextualSpecificity,
    "reflective criticality" => RubricCategory::ReflectiveCriticality,
    "temporal friction" => RubricCategory::TemporalFriction,
    "multimodal evidence" => RubricCategory::MultimodalEvidence,
    "explicit ai interrogation" => RubricCategory::ExplicitAiInterrogation,
    "real-time defence" => RubricCategory::RealTimeDefence,
    "social and collaborative labour" => RubricCategory::SocialAndCollaborativeLabour,
    "data recency" => RubricCategory::DataRecency,
};

impl RubricCategory {
    /// 规范顺序
    pub const ALL: [RubricCategory; 10] = [
        RubricCategory::FinalProductWeighting,
        RubricCategory::IterativeDocumentation,
        RubricCategory::ContextualSpecificity,
        RubricCategory::ReflectiveCriticality,
        RubricCategory::TemporalFriction,
        RubricCategory::MultimodalEvidence,
        RubricCategory::ExplicitAiInterrogation,
        RubricCategory::RealTimeDefence,
        RubricCategory::SocialAndCollaborativeLabour,
        RubricCategory::DataRecency,
    ];

    /// 标准名称
    pub fn label(self) -> &'static str {
        match self {
            RubricCategory::FinalProductWeighting => "Final product weighting",
            RubricCategory::IterativeDocumentation => "Iterative documentation",
            RubricCategory::ContextualSpecificity => "Contextual specificity",
            RubricCategory::ReflectiveCriticality => "Reflective criticality",
            RubricCategory::TemporalFriction => "Temporal friction",
            RubricCategory::MultimodalEvidence => "Multimodal evidence",
            RubricCategory::ExplicitAiInterrogation => "Explicit AI interrogation",
            RubricCategory::RealTimeDefence => "Real-time defence",
            RubricCategory::SocialAndCollaborativeLabour => "Social and collaborative labour",
            RubricCategory::DataRecency => "Data recency",
        }
    }

    /// 按名称精确解析（忽略大小写和首尾空白）
    pub fn from_label(label: &str) -> Option<Self> {
        LABEL_LOOKUP.get(label.trim().to_lowercase().as_str()).copied()
    }

    /// 判断模型给出的维度名称是否对应本维度
    ///
    /// 忽略大小写，任一方包含另一方即视为匹配；空名称永不匹配。
    pub fn matches(self, name: &str) -> bool {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return false;
        }
        let label = self.label().to_lowercase();
        label.contains(&name) || name.contains(&label)
    }

    /// 发送给模型的评分说明
    pub fn description(self) -> &'static str {
        match self {
            RubricCategory::FinalProductWeighting => "Does the assessment reward the learning process over the final product? Score 1 (single end-of-term submission) to 5 (multiple formative stages).",
            RubricCategory::IterativeDocumentation => "Does the assessment require evidence of the messy middle of learning? Score 1 (polished PDF only) to 5 (mandatory brain-dumps, mind maps, rejected ideas).",
            RubricCategory::ContextualSpecificity => "Is the assessment tied to specific local/classroom contexts that AI cannot access? Score 1 (broad theoretical questions) to 5 (unique in-class discussions).",
            RubricCategory::ReflectiveCriticality => "Does the assessment require deep personal synthesis? Score 1 (generic professional reflection) to 5 (narrative on emotional reactions).",
            RubricCategory::TemporalFriction => "Is it physically impossible to complete quickly? Score 1 (can be done in one night) to 5 (longitudinal study over weeks).",
            RubricCategory::MultimodalEvidence => "Does the assessment require non-text outputs? Score 1 (standard Word document) to 5 (audio, physical models, hand-drawn).",
            RubricCategory::ExplicitAiInterrogation => "Does the assessment require students to critique AI outputs? Score 1 (AI ignored or banned) to 5 (generate and critique AI drafts).",
            RubricCategory::RealTimeDefence => "Does the assessment include live interaction? Score 1 (entirely asynchronous) to 5 (mandatory viva with Q&A).",
            RubricCategory::SocialAndCollaborativeLabour => "Does the assessment require verified group work? Score 1 (entirely solitary work) to 5 (observed collaboration with peer review).",
            RubricCategory::DataRecency => "Does the assessment engage with very recent events/data? Score 1 (static concepts from decades ago) to 5 (last fortnight).",
        }
    }

    /// 该维度的教学背景说明
    pub fn pedagogical_context(self) -> &'static str {
        match self {
            RubricCategory::FinalProductWeighting => "When all the marks sit on a single final deadline, students feel pressure to deliver a polished product at any cost. That makes AI tempting. If you spread the marks across drafts, feedback responses, and planning stages, you reward the actual learning journey. Students cannot fake sustained engagement over weeks.",
            RubricCategory::IterativeDocumentation => "AI tools hide their tracks. They produce seamless, polished text instantly. Real human learning is messy. It involves false starts, abandoned ideas, and gradual improvements. When you ask students to show this messiness through lab books, draft annotations, or revision logs, you make AI automation much harder.",
            RubricCategory::ContextualSpecificity => "AI models train on generic textbook knowledge. They excel at broad theoretical questions. They struggle with specific contexts like your classroom debate last Tuesday or the guest speaker who challenged conventional thinking. When you anchor assessments in unique moments and places, AI cannot replicate that specificity.",
            RubricCategory::ReflectiveCriticality => "Generic professional reflection is easy to automate. Genuine reflection requires vulnerability. It asks students to describe specific moments of confusion, discomfort, and how their values shifted. AI cannot fabricate lived experience. Only humans can connect theory to what it felt like to fail and try again.",
            RubricCategory::TemporalFriction => "If an assessment can be completed in one night, it will be. AI thrives on speed. Longitudinal studies require data collection over weeks. Peer review cycles force students to wait for feedback before progressing. When time itself becomes part of the assessment structure, students must engage over the long term.",
            RubricCategory::MultimodalEvidence => "Text is AI's native format. Word documents are trivially easy to automate. A hand-drawn concept map, a short audio reflection, or a physical model presented in class moves students beyond the textbox. These modes add layers of human authenticity that pure text cannot match.",
            RubricCategory::ExplicitAiInterrogation => "Banning AI does not work. Students use it anyway. Bring the tool into the classroom as something to study and critique. Ask students to generate AI content, then spend the assessment identifying its errors, biases, and missing nuance. Human expertise matters because AI fails in predictable ways.",
            RubricCategory::RealTimeDefence => "Live conversation reveals understanding in ways written text cannot. AI can draft perfect scripts. It cannot handle spontaneous questions about methodology or justify choices on the spot. A short viva or a live presentation with Q&A makes authentic ownership visible through unscripted speech.",
            RubricCategory::SocialAndCollaborativeLabour => "Automation is solitary. Genuine learning thrives in groups. When students must explain their thinking to peers, respond to challenges, and negotiate ideas together, they create witnesses to their process. Verified group work and graded peer feedback make outsourcing to AI much harder.",
            RubricCategory::DataRecency => "AI training data is always historical. It knows the past well but struggles with the present. When you ask students to analyse this week's policy change or datasets released in the last fortnight, you create a knowledge barrier. This tethers assessments to the living world rather than static textbook content.",
        }
    }

    /// 三条具体改进建议
    pub fn improvement_actions(self) -> [&'static str; 3] {
        match self {
            RubricCategory::FinalProductWeighting => [
                "Allocate 20% of marks to the initial research plan",
                "Require a 'response to feedback' log as part of the final submission",
                "Use scaffolded deadlines throughout the module",
            ],
            RubricCategory::IterativeDocumentation => [
                "Mandate the use of a weekly digital or physical lab book/process log",
                "Include a 'failed paths' section where students explain ideas they abandoned",
                "Encourage version control or tracked changes as evidence",
            ],
            RubricCategory::ContextualSpecificity => [
                "Reference a specific guest speaker or seminar debate in the prompt",
                "Require students to apply theory to a local community issue",
                "Update prompts every semester to reflect the current political or social climate",
            ],
            RubricCategory::ReflectiveCriticality => [
                "Ask for 'I' statements and specific sensory details of the learning experience",
                "Encourage non-standard formats like reflective poetry or audio diaries",
                "Require students to link specific personal values to the academic content",
            ],
            RubricCategory::TemporalFriction => [
                "Build in a mandated peer-review cycle in week 6 of a 12-week module",
                "Require data collection that occurs at specific intervals",
                "Design tasks that require sequential steps that cannot be bypassed",
            ],
            RubricCategory::MultimodalEvidence => [
                "Replace one essay with a 5-minute narrated video or podcast",
                "Require hand-drawn diagrams or mind maps to be scanned and included",
                "Use pitch sessions where students explain concepts verbally",
            ],
            RubricCategory::ExplicitAiInterrogation => [
                "Set an assessment where the goal is to break the AI's logic",
                "Task students with fact-checking a synthetic essay",
                "Discuss the ethical and environmental costs of AI in the classroom",
            ],
            RubricCategory::RealTimeDefence => [
                "Implement 10-minute 'flash vivas' for high-stakes work",
                "Use in-class critique sessions where peers question each other's methodology",
                "Record short verbal feedback loops between tutor and student",
            ],
            RubricCategory::SocialAndCollaborativeLabour => [
                "Grade the quality of the feedback a student gives to their teammates",
                "Use collaborative drafting sessions during seminar time",
                "Require a reflective log on the challenges of the group dynamic",
            ],
            RubricCategory::DataRecency => [
                "Use 'this morning's headlines' as the basis for a theory application",
                "Require students to use the most recent 6 months of a specific journal",
                "Set tasks based on live, streaming data or current social media trends",
            ],
        }
    }
}

impl fmt::Display for RubricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
