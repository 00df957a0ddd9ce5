use crate::colors::Palette;
use crate::git::Git;

/// state shared by every command for the lifetime of the run
pub struct Session<'a> {
    /// how to reach the repository
    pub git: &'a dyn Git,

    /// resolved interactive color slots
    pub colors: Palette,
}
