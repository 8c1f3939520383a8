#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Direction {
    Up,
    Down,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    NextTab,
    PrevTab,
    Scroll(Direction),
    Refresh,
    Export,
    RequestClear,
    ConfirmClear,
    CancelClear,
    ToggleHelp,
    None,
}
