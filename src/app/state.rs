//! Setup screen state
//!
//! Collects mode, level and player names before a game starts.

use sinonimoak::{DifficultyLevel, GameMode};

/// Longest accepted player name
pub const MAX_NAME_LEN: usize = 16;

/// Field with keyboard focus on the setup screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupField {
    Mode,
    Level,
    Players,
    Start,
}

impl SetupField {
    /// All fields in display order
    pub fn all() -> &'static [SetupField] {
        &[
            SetupField::Mode,
            SetupField::Level,
            SetupField::Players,
            SetupField::Start,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            SetupField::Mode => "Mode",
            SetupField::Level => "Level",
            SetupField::Players => "Players",
            SetupField::Start => "Start",
        }
    }
}

/// What the user asked for when pressing Enter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupAction {
    /// Nothing to do beyond updating the form
    None,
    /// Start a game with the current settings
    Start,
}

/// Editable game settings
#[derive(Debug, Clone)]
pub struct SetupForm {
    pub mode: GameMode,
    pub level: DifficultyLevel,
    pub players: Vec<String>,
    /// Name being typed on the players row
    pub name_input: String,
    pub focus: SetupField,
    max_players: usize,
}

impl SetupForm {
    pub fn new(level: DifficultyLevel, players: Vec<String>, max_players: usize) -> Self {
        let mut players: Vec<String> = players
            .into_iter()
            .map(|p| p.trim().chars().take(MAX_NAME_LEN).collect::<String>())
            .filter(|p| !p.is_empty())
            .collect();
        players.dedup();
        players.truncate(max_players);
        Self {
            mode: GameMode::Regular,
            level,
            players,
            name_input: String::new(),
            focus: SetupField::Mode,
            max_players,
        }
    }

    fn focus_index(&self) -> usize {
        SetupField::all()
            .iter()
            .position(|f| *f == self.focus)
            .unwrap_or(0)
    }

    pub fn focus_up(&mut self) {
        let i = self.focus_index();
        if i > 0 {
            self.focus = SetupField::all()[i - 1];
        }
    }

    pub fn focus_down(&mut self) {
        let i = self.focus_index();
        if i + 1 < SetupField::all().len() {
            self.focus = SetupField::all()[i + 1];
        }
    }

    /// Left/right change the focused value
    pub fn cycle(&mut self, forward: bool) {
        match self.focus {
            SetupField::Mode => {
                self.mode = match self.mode {
                    GameMode::Regular => GameMode::Daily,
                    GameMode::Daily => GameMode::Regular,
                };
            }
            SetupField::Level => {
                let current = self.level.get();
                let next = if forward { current + 1 } else { current.saturating_sub(1) };
                if let Some(level) = DifficultyLevel::new(next) {
                    self.level = level;
                }
            }
            _ => {}
        }
    }

    pub fn on_char(&mut self, c: char) {
        if self.focus == SetupField::Players
            && !c.is_control()
            && self.name_input.chars().count() < MAX_NAME_LEN
        {
            self.name_input.push(c);
        }
    }

    /// Delete a typed character, or the last player when nothing is typed
    pub fn on_backspace(&mut self) {
        if self.focus != SetupField::Players {
            return;
        }
        if self.name_input.pop().is_none() {
            self.players.pop();
        }
    }

    pub fn on_submit(&mut self) -> SetupAction {
        match self.focus {
            SetupField::Players => {
                self.add_player();
                SetupAction::None
            }
            SetupField::Start => {
                // A typed but not yet added name still counts
                self.add_player();
                SetupAction::Start
            }
            _ => {
                self.focus_down();
                SetupAction::None
            }
        }
    }

    fn add_player(&mut self) {
        let name = self.name_input.trim().to_string();
        self.name_input.clear();
        if name.is_empty() || self.players.len() >= self.max_players {
            return;
        }
        if !self.players.contains(&name) {
            self.players.push(name);
        }
    }

    pub fn max_players(&self) -> usize {
        self.max_players
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> SetupForm {
        SetupForm::new(DifficultyLevel::default(), vec![], 3)
    }

    fn type_name(form: &mut SetupForm, name: &str) {
        for c in name.chars() {
            form.on_char(c);
        }
        form.on_submit();
    }

    #[test]
    fn test_focus_stays_in_bounds() {
        let mut form = form();
        form.focus_up();
        assert_eq!(form.focus, SetupField::Mode);
        for _ in 0..10 {
            form.focus_down();
        }
        assert_eq!(form.focus, SetupField::Start);
    }

    #[test]
    fn test_mode_toggles() {
        let mut form = form();
        form.cycle(true);
        assert_eq!(form.mode, GameMode::Daily);
        form.cycle(false);
        assert_eq!(form.mode, GameMode::Regular);
    }

    #[test]
    fn test_level_clamped() {
        let mut form = form();
        form.focus = SetupField::Level;
        form.cycle(false);
        assert_eq!(form.level.get(), 1);
        for _ in 0..10 {
            form.cycle(true);
        }
        assert_eq!(form.level.get(), 4);
    }

    #[test]
    fn test_add_and_remove_players() {
        let mut form = form();
        form.focus = SetupField::Players;
        type_name(&mut form, "Ane");
        type_name(&mut form, "Jon");
        type_name(&mut form, "Ane");
        assert_eq!(form.players, vec!["Ane", "Jon"]);

        form.on_backspace();
        assert_eq!(form.players, vec!["Ane"]);
    }

    #[test]
    fn test_player_limit() {
        let mut form = form();
        form.focus = SetupField::Players;
        for name in ["a", "b", "c", "d"] {
            type_name(&mut form, name);
        }
        assert_eq!(form.players.len(), 3);
    }

    #[test]
    fn test_typing_ignored_outside_players() {
        let mut form = form();
        form.on_char('x');
        assert!(form.name_input.is_empty());
    }

    #[test]
    fn test_start_adds_pending_name() {
        let mut form = form();
        form.focus = SetupField::Players;
        form.on_char('M');
        form.focus = SetupField::Start;
        assert_eq!(form.on_submit(), SetupAction::Start);
        assert_eq!(form.players, vec!["M"]);
    }

    #[test]
    fn test_initial_players_cleaned() {
        let form = SetupForm::new(
            DifficultyLevel::default(),
            vec![" Ane ".into(), "".into(), "Jon".into()],
            10,
        );
        assert_eq!(form.players, vec!["Ane", "Jon"]);
    }
}
