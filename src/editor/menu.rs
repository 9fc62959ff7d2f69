use crate::domain::HeadingLevel;
use crate::editor::surface::{Caret, Surface};
use derive_more::derive::Display;

pub const TRIGGER: char = '/';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum MenuAction {
    #[display("subpage")]
    NewLinkedPage,
    #[display("h{_0}")]
    Heading(HeadingLevel),
    #[display("list")]
    ListItem,
    #[display("hr")]
    HorizontalRule,
    #[display("text")]
    Text,
}

impl MenuAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "subpage" => Some(MenuAction::NewLinkedPage),
            "h1" => Some(MenuAction::Heading(HeadingLevel::H1)),
            "h2" => Some(MenuAction::Heading(HeadingLevel::H2)),
            "h3" => Some(MenuAction::Heading(HeadingLevel::H3)),
            "list" => Some(MenuAction::ListItem),
            "hr" => Some(MenuAction::HorizontalRule),
            "text" => Some(MenuAction::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuOption {
    pub label: &'static str,
    pub description: &'static str,
    pub action: MenuAction,
}

pub const MENU_OPTIONS: [MenuOption; 7] = [
    MenuOption {
        label: "Novo Fóton",
        description: "Criar página vinculada",
        action: MenuAction::NewLinkedPage,
    },
    MenuOption {
        label: "Título 1",
        description: "Título grande",
        action: MenuAction::Heading(HeadingLevel::H1),
    },
    MenuOption {
        label: "Título 2",
        description: "Título médio",
        action: MenuAction::Heading(HeadingLevel::H2),
    },
    MenuOption {
        label: "Título 3",
        description: "Título pequeno",
        action: MenuAction::Heading(HeadingLevel::H3),
    },
    MenuOption {
        label: "Lista",
        description: "Lista com marcadores",
        action: MenuAction::ListItem,
    },
    MenuOption {
        label: "Linha horizontal",
        description: "Divisor",
        action: MenuAction::HorizontalRule,
    },
    MenuOption {
        label: "Texto",
        description: "Parágrafo normal",
        action: MenuAction::Text,
    },
];

/// Where the menu is anchored, in surface coordinates (top-level line, char column).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MenuPosition {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandMenu {
    anchor: Option<Caret>,
}

impl CommandMenu {
    pub fn is_open(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn anchor(&self) -> Option<&Caret> {
        self.anchor.as_ref()
    }

    pub fn position(&self) -> Option<MenuPosition> {
        self.anchor.as_ref().map(|caret| MenuPosition {
            line: caret.line(),
            column: caret.offset,
        })
    }

    pub fn options(&self) -> &'static [MenuOption] {
        &MENU_OPTIONS
    }

    /// Re-evaluated after every input or caret move: open while the text right before the
    /// caret ends with the trigger, closed otherwise.
    pub fn observe(&mut self, surface: &Surface, caret: &Caret) {
        let triggered = surface
            .text_before(caret)
            .is_some_and(|before| before.ends_with(TRIGGER));
        self.anchor = triggered.then(|| caret.clone());
    }

    pub fn close(&mut self) {
        self.anchor = None;
    }
}
