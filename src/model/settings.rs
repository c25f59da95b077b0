//! Database-level options

/// SQL Server version target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlServerVersion {
    Sql130, // SQL Server 2016
    Sql140, // SQL Server 2017
    Sql150, // SQL Server 2019
    #[default]
    Sql160, // SQL Server 2022
}

impl std::str::FromStr for SqlServerVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sql130" | "130" => Ok(SqlServerVersion::Sql130),
            "sql140" | "140" => Ok(SqlServerVersion::Sql140),
            "sql150" | "150" => Ok(SqlServerVersion::Sql150),
            "sql160" | "160" => Ok(SqlServerVersion::Sql160),
            _ => Err(format!("Unknown SQL Server version: {}", s)),
        }
    }
}

impl SqlServerVersion {
    /// Database compatibility level for this version
    pub fn compatibility_level(&self) -> u16 {
        match self {
            SqlServerVersion::Sql130 => 130,
            SqlServerVersion::Sql140 => 140,
            SqlServerVersion::Sql150 => 150,
            SqlServerVersion::Sql160 => 160,
        }
    }
}

/// Options applied right after `CREATE DATABASE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSettings {
    /// Default collation (e.g., "Latin1_General_100_CI_AS"); omitted when unset
    pub collation: Option<String>,
    pub allow_snapshot_isolation: bool,
    pub read_committed_snapshot: bool,
    pub compatibility_level: u16,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            collation: None,
            allow_snapshot_isolation: false,
            read_committed_snapshot: false,
            compatibility_level: SqlServerVersion::default().compatibility_level(),
        }
    }
}

impl DatabaseSettings {
    pub fn collation(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn allow_snapshot_isolation(mut self, enabled: bool) -> Self {
        self.allow_snapshot_isolation = enabled;
        self
    }

    pub fn read_committed_snapshot(mut self, enabled: bool) -> Self {
        self.read_committed_snapshot = enabled;
        self
    }

    pub fn compatibility_level(mut self, level: u16) -> Self {
        self.compatibility_level = level;
        self
    }

    pub fn target_platform(self, version: SqlServerVersion) -> Self {
        self.compatibility_level(version.compatibility_level())
    }

    /// `CREATE DATABASE` followed by the three `ALTER DATABASE` statements,
    /// each without its batch separator.
    pub fn statements(&self, database_name: &str) -> [String; 4] {
        let create = match self.collation.as_deref() {
            Some(collation) if !collation.trim().is_empty() => {
                format!("CREATE DATABASE {} COLLATE {}", database_name, collation)
            }
            _ => format!("CREATE DATABASE {}", database_name),
        };

        [
            create,
            format!(
                "ALTER DATABASE {} SET COMPATIBILITY_LEVEL = {}",
                database_name, self.compatibility_level
            ),
            format!(
                "ALTER DATABASE {} SET ALLOW_SNAPSHOT_ISOLATION {}",
                database_name,
                on_off(self.allow_snapshot_isolation)
            ),
            format!(
                "ALTER DATABASE {} SET READ_COMMITTED_SNAPSHOT {}",
                database_name,
                on_off(self.read_committed_snapshot)
            ),
        ]
    }
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "ON"
    } else {
        "OFF"
    }
}
