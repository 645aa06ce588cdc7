//! In-memory game state.

use game_core::{Player, Project, ProjectId, SavedGame};

/// Whether a game is in progress.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum GameState {
    /// No player has been created.
    #[default]
    NoGame,
    Active(ActiveGame),
}

/// A running game: the player and everything they own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveGame {
    pub player: Player,
    /// Projects in creation order.
    pub projects: Vec<Project>,
    /// Selected project, always one of `projects` when set.
    pub current_project: Option<ProjectId>,
}

impl ActiveGame {
    /// New game for `player` with no projects.
    pub fn new(player: Player) -> Self {
        Self {
            player,
            projects: Vec::new(),
            current_project: None,
        }
    }

    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_mut(&mut self, id: ProjectId) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    pub fn current_project(&self) -> Option<&Project> {
        self.current_project.and_then(|id| self.project(id))
    }
}

impl GameState {
    /// Rebuild from a (validated) snapshot.
    pub fn from_saved(save: SavedGame) -> Self {
        match save.player {
            Some(player) => GameState::Active(ActiveGame {
                player,
                projects: save.projects,
                current_project: save.current_project,
            }),
            None => GameState::NoGame,
        }
    }

    /// Snapshot form, carrying the store's lifecycle flags.
    pub fn to_saved(&self, loading: bool, initialized: bool) -> SavedGame {
        match self {
            GameState::NoGame => SavedGame {
                player: None,
                projects: Vec::new(),
                current_project: None,
                loading,
                initialized,
            },
            GameState::Active(game) => SavedGame {
                player: Some(game.player.clone()),
                projects: game.projects.clone(),
                current_project: game.current_project,
                loading,
                initialized,
            },
        }
    }

    pub fn active(&self) -> Option<&ActiveGame> {
        match self {
            GameState::Active(game) => Some(game),
            GameState::NoGame => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, GameState::Active(_))
    }
}
