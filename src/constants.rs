// chooser
pub const PREFIX_MIN_LEN: usize = 1;
pub const PREFIX_MAX_LEN: usize = 4;
pub const COMMAND_COLUMNS: usize = 4;

// git
pub const EMPTY_TREE_OID: &str = "4b825dc642cb6eb9a060e54bf8d69288fbee4904";

// colors
pub const COLOR_RESET: &str = "\x1b[m";
pub const DEFAULT_HEADER_COLOR: &str = "bold";
pub const DEFAULT_PROMPT_COLOR: &str = "bold blue";
pub const DEFAULT_ERROR_COLOR: &str = "bold red";
pub const DEFAULT_FRAGINFO_COLOR: &str = "cyan";
