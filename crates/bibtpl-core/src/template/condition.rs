//! Tri-state condition stack driving conditional output.

/// State of one conditional level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionState {
    True,
    False,
    /// Opened under a branch that is not `True`; never evaluated, never flips.
    Suppressed,
}

impl ConditionState {
    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::True
        } else {
            Self::False
        }
    }

    /// Else-branch transition.
    pub fn inverted(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Suppressed => Self::Suppressed,
        }
    }
}

/// Nested conditional states above a permanent `True` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionStack {
    levels: Vec<ConditionState>,
}

impl Default for ConditionStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionStack {
    pub fn new() -> Self {
        Self {
            levels: vec![ConditionState::True],
        }
    }

    pub fn top(&self) -> ConditionState {
        self.levels.last().copied().unwrap_or(ConditionState::True)
    }

    /// Whether output is currently emitted.
    pub fn is_active(&self) -> bool {
        self.top() == ConditionState::True
    }

    /// Number of open conditionals (the sentinel excluded).
    pub fn depth(&self) -> usize {
        self.levels.len() - 1
    }

    pub fn push(&mut self, state: ConditionState) {
        self.levels.push(state);
    }

    /// Invert the innermost open conditional. Returns `false` when none is open.
    pub fn invert(&mut self) -> bool {
        if self.depth() == 0 {
            return false;
        }
        if let Some(top) = self.levels.last_mut() {
            *top = top.inverted();
        }
        true
    }

    /// Close the innermost open conditional. Returns `false` when none is open.
    pub fn pop(&mut self) -> bool {
        if self.depth() == 0 {
            return false;
        }
        self.levels.pop();
        true
    }
}
