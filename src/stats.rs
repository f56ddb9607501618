use indexmap::IndexMap;

/// Latest score seen for each category.
///
/// A later score for the same category replaces the earlier one in place;
/// categories are never evicted. Iteration follows first-insertion order.
#[derive(Debug, Default, Clone)]
pub struct ScoreTable {
    scores: IndexMap<String, f64>,
}

impl ScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, category: &str, score: f64) {
        match self.scores.get_mut(category) {
            Some(slot) => *slot = score,
            None => {
                self.scores.insert(category.to_string(), score);
            }
        }
    }

    /// Sum of every stored score.
    pub fn total(&self) -> f64 {
        self.scores.values().sum()
    }
}

/// A [`ScoreTable`] per group, so scores are keyed by `(group, category)`.
#[derive(Debug, Default, Clone)]
pub struct GroupedScoreTable {
    groups: IndexMap<String, ScoreTable>,
}

impl GroupedScoreTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, group: &str, category: &str, score: f64) {
        if let Some(table) = self.groups.get_mut(group) {
            table.record(category, score);
            return;
        }
        let mut table = ScoreTable::new();
        table.record(category, score);
        self.groups.insert(group.to_string(), table);
    }

    pub fn group(&self, group: &str) -> Option<&ScoreTable> {
        self.groups.get(group)
    }
}

#[cfg(test)]
impl ScoreTable {
    fn get(&self, category: &str) -> Option<f64> {
        self.scores.get(category).copied()
    }

    fn len(&self) -> usize {
        self.scores.len()
    }
}
