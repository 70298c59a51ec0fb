#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum AppTab {
    #[default]
    Dashboard,
    Quiz,
    Workflow,
    CurrentAffairs,
    ImageAnalyze,
    Syllabus,
}

impl AppTab {
    pub fn all() -> [AppTab; 6] {
        [
            AppTab::Dashboard,
            AppTab::Quiz,
            AppTab::Workflow,
            AppTab::CurrentAffairs,
            AppTab::ImageAnalyze,
            AppTab::Syllabus,
        ]
    }

    pub fn label(self) -> &'static str {
        match self {
            AppTab::Dashboard => "Home",
            AppTab::Quiz => "Live Quiz",
            AppTab::Workflow => "n8n Config",
            AppTab::CurrentAffairs => "News AI",
            AppTab::ImageAnalyze => "Scan Notes",
            AppTab::Syllabus => "Syllabus",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            AppTab::Dashboard => "🏠",
            AppTab::Quiz => "⚡",
            AppTab::Workflow => "⚙",
            AppTab::CurrentAffairs => "🌍",
            AppTab::ImageAnalyze => "📸",
            AppTab::Syllabus => "📚",
        }
    }
}
