use crate::config::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    pub index: usize,
    pub name: String,
    pub score: i64,
}

/// Scoreboard for one session. Scores start at zero and are never persisted.
#[derive(Debug, Clone, Default)]
pub struct Teams {
    teams: Vec<Team>,
}

impl Teams {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let teams = names
            .into_iter()
            .enumerate()
            .map(|(index, name)| Team {
                index,
                name: name.into(),
                score: 0,
            })
            .collect();
        Self { teams }
    }

    /// One team per `rules.number_teams`, named from `[team_names]`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new((0..settings.rules.number_teams).map(|i| settings.team_name(i)))
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn get(&self, index: usize) -> Option<&Team> {
        self.teams.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Team> {
        self.teams.iter()
    }

    #[cfg(test)]
    pub fn scores(&self) -> Vec<i64> {
        self.teams.iter().map(|t| t.score).collect()
    }

    /// Add `points` (possibly negative) and return the new score.
    pub fn add_points(&mut self, index: usize, points: i64) -> Option<i64> {
        let team = self.teams.get_mut(index)?;
        team.score = team.score.saturating_add(points);
        Some(team.score)
    }
}
