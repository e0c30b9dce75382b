use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl Snippet {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires <= now
    }
}

/// How long a new snippet stays visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnippetExpiry {
    OneDay,
    OneWeek,
    OneYear,
}

impl SnippetExpiry {
    /// The literal form values accepted by the create form.
    pub const PERMITTED: [&'static str; 3] = ["365", "7", "1"];

    pub fn days(self) -> i64 {
        match self {
            SnippetExpiry::OneDay => 1,
            SnippetExpiry::OneWeek => 7,
            SnippetExpiry::OneYear => 365,
        }
    }

    pub fn duration(self) -> Duration {
        Duration::days(self.days())
    }
}

impl TryFrom<&str> for SnippetExpiry {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "1" => Ok(Self::OneDay),
            "7" => Ok(Self::OneWeek),
            "365" => Ok(Self::OneYear),
            other => Err(format!("{} is not a supported expiry.", other)),
        }
    }
}
