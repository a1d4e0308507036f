/// Pipeline stage a status update belongs to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Splitting,
    Plotting,
    Cleaning,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Splitting => write!(f, "Splitting matrices"),
            Self::Plotting => write!(f, "Preparing plots"),
            Self::Cleaning => write!(f, "Cleaning up"),
        }
    }
}

/// Progress report sent from the pipeline to whoever is displaying it
#[derive(Debug, Clone, Default)]
pub struct PipelineStatus {
    pub stage: Stage,
    /// Fraction of the stage completed, in [0, 1]
    pub progress: f32,
    /// Item currently worked on (run name, detector)
    pub label: String,
}

impl PipelineStatus {
    pub fn new(stage: Stage, progress: f32, label: String) -> Self {
        Self {
            stage,
            progress,
            label,
        }
    }
}
