//! Agent-facing description of the adapter's capabilities.

use crate::config::Config;

/// Built-in description shown to the calling agent when no override is
/// configured.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You have access to a remote development environment through the devenv tool.

Actions:
- terminal: run a shell command in the remote environment. Requires `command`.
  Output is streamed back and returned as text; long-running commands are cut
  off at the configured deadline and return whatever partial output arrived.
- file: operate on remote files. Requires `operation` (read, write, list,
  delete) and `path`; `write` also requires `content`.
- analysis: start a code analysis run, optionally scoped with `path`.
- test: run tests. Requires `operation` (repository or local); `target`
  optionally names the repository URL or local path.
- project: manage projects. Requires `operation` (list, get, create, update,
  delete); `id` for get/update/delete, `body` for create/update.

Every response is plain text. Errors are returned as descriptive text rather
than failures; decide yourself whether to retry.";

/// Description text, honoring the `SYSTEM_PROMPT` override when set.
#[must_use]
pub fn system_prompt(config: &Config) -> String {
    config
        .system_prompt
        .clone()
        .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_owned())
}
