#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SyllabusTrack {
    Upsc,
    Bpsc,
}

impl SyllabusTrack {
    pub fn all() -> [SyllabusTrack; 2] {
        [SyllabusTrack::Upsc, SyllabusTrack::Bpsc]
    }

    pub fn title(self) -> &'static str {
        match self {
            SyllabusTrack::Upsc => "UPSC Milestone",
            SyllabusTrack::Bpsc => "BPSC Milestone",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            SyllabusTrack::Upsc => "🏛",
            SyllabusTrack::Bpsc => "📍",
        }
    }

    pub fn topics(self) -> &'static [&'static str] {
        match self {
            SyllabusTrack::Upsc => &[
                "Ancient & Mediaeval History",
                "Indian Polity & Governance",
                "Economy & Agriculture",
                "Science & Tech Development",
                "Ethics & Aptitude",
            ],
            SyllabusTrack::Bpsc => &[
                "History & Culture of Bihar",
                "Geography & Natural Resources",
                "State Economic Survey",
                "Bihar Specific Current Affairs",
                "General Science (Bihar Level)",
            ],
        }
    }
}

/// Tick state for both milestone lists. Lives only as long as the window.
#[derive(Debug, Clone)]
pub struct SyllabusChecklist {
    upsc: Vec<bool>,
    bpsc: Vec<bool>,
}

impl Default for SyllabusChecklist {
    fn default() -> Self {
        Self {
            upsc: vec![false; SyllabusTrack::Upsc.topics().len()],
            bpsc: vec![false; SyllabusTrack::Bpsc.topics().len()],
        }
    }
}

impl SyllabusChecklist {
    fn marks(&self, track: SyllabusTrack) -> &[bool] {
        match track {
            SyllabusTrack::Upsc => &self.upsc,
            SyllabusTrack::Bpsc => &self.bpsc,
        }
    }

    pub fn is_checked(&self, track: SyllabusTrack, topic: usize) -> bool {
        self.marks(track).get(topic).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, track: SyllabusTrack, topic: usize) {
        let marks = match track {
            SyllabusTrack::Upsc => &mut self.upsc,
            SyllabusTrack::Bpsc => &mut self.bpsc,
        };
        if let Some(mark) = marks.get_mut(topic) {
            *mark = !*mark;
        }
    }

    pub fn completed(&self, track: SyllabusTrack) -> usize {
        self.marks(track).iter().filter(|done| **done).count()
    }
}
