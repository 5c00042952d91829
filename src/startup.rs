//! Interactive startup questions: which directory, and any hint about how to
//! organize it.

use crate::error::StartupError;
use crate::guard::{self, AllowedRoot, TargetDirectory};
use crate::ui::render::RenderSink;
use crate::ui::settings;
use crate::ui::terminal::Console;
use tracing::debug;

/// Pick the directory to organize.
///
/// A configured default is used when it passes [`guard::validate`];
/// otherwise (or when there is none) the user is asked until they give a
/// valid directory. Closed input ends startup.
pub fn select_target_directory(
    default: Option<&str>,
    root: &AllowedRoot,
    console: &mut dyn Console,
    sink: &dyn RenderSink,
) -> Result<TargetDirectory, StartupError> {
    if let Some(candidate) = default.map(str::trim).filter(|c| !c.is_empty()) {
        match guard::validate(candidate, root) {
            Ok(target) => {
                sink.field("Target directory", &target.to_string());
                return Ok(target);
            }
            Err(rejection) => {
                debug!(%rejection, "configured target directory refused");
                sink.warn(&format!("Default directory not usable: {rejection}"));
            }
        }
    }

    sink.detail(&format!(
        "The directory must be inside: {}",
        root.path().display()
    ));
    loop {
        let Some(answer) = console
            .read_line(settings::PROMPT_TARGET_DIR)
            .map_err(|_| StartupError::NoTargetDirectory)?
        else {
            return Err(StartupError::NoTargetDirectory);
        };
        let answer = answer.trim();
        if answer.is_empty() {
            continue;
        }
        match guard::validate(answer, root) {
            Ok(target) => {
                sink.field("Target directory", &target.to_string());
                return Ok(target);
            }
            Err(rejection) => sink.error(&format!("{rejection}. Please try again.")),
        }
    }
}

/// Optional free-text hint for the first planning request.
///
/// `preset` (from `--context`) skips the question. Blank answers and closed
/// input mean no hint.
pub fn ask_organization_context(preset: Option<&str>, console: &mut dyn Console) -> Option<String> {
    if let Some(preset) = preset {
        let preset = preset.trim();
        return (!preset.is_empty()).then(|| preset.to_string());
    }
    match console.read_line(settings::PROMPT_CONTEXT) {
        Ok(Some(answer)) if !answer.trim().is_empty() => Some(answer.trim().to_string()),
        _ => None,
    }
}
