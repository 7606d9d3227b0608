extern crate unindent;

use anyhow::Context;
use unindent::unindent;

use super::State;
use crate::eval::{self, Evaluator};

const USAGE: &str = r#"
    Usage
      Enter an expression and press Enter. Results are automatically saved as
      variables which can be used directly in later expressions. To name a
      variable yourself, use the '=' operator: '$my_variable = 1 + 1'. To store
      text without evaluating it, use '<=' instead: '$rate <= 1.08'.

      If a variable gets in the way of an expression like '$5 in UK pounds',
      put a space after the dollar sign.

      Memory is kept between sessions automatically.

    Commands
      help                Shows this message.
      list                Shows the current contents of memory and list of
                          saved memory files.
      delete $var         Deletes the named variable.
      delete all          Deletes all variables in memory.
      delete file name    Deletes a saved memory file.
      save [name]         Saves the contents of memory to a file.
      restore [name]      Restores the contents of memory from a file.
      clear               Clears the screen.
      quit                Quits the program.

    Special Variables
      $_                  Results of the last expression.
"#;

pub fn usage() -> String {
    unindent(USAGE).trim_end().to_string()
}

pub fn save<E>(state: &State<E>, name: Option<&str>) -> anyhow::Result<String> {
    let message = state
        .saves
        .save(&state.memory, name)
        .context("Error saving contents of memory")?;
    Ok(format!("  {}", message))
}

pub fn restore<E>(state: &mut State<E>, name: Option<&str>) -> anyhow::Result<String> {
    let message = state
        .saves
        .restore(&mut state.memory, name)
        .context("Error restoring memory from file")?;
    Ok(format!("  {}", message))
}

pub fn list<E>(state: &State<E>) -> String {
    let mut out = state.memory.dump();
    out.push_str("\n\n");

    let files = state.saves.list();
    if files.is_empty() {
        out.push_str("  There are no saved memory files.");
    } else {
        out.push_str(&format!(
            "  Saved memory files in {}:",
            state.saves.path().display()
        ));
        for file in files {
            out.push_str("\n    ");
            out.push_str(&file);
        }
    }
    out
}

pub fn delete<E>(state: &mut State<E>, name: &str) -> anyhow::Result<String> {
    state.memory.delete(name)?;
    Ok(format!("  Variable ${} deleted.", name))
}

pub fn delete_file<E>(state: &State<E>, name: &str) -> anyhow::Result<String> {
    let message = state
        .saves
        .remove(name)
        .context("Error deleting memory file")?;
    Ok(format!("  {}", message))
}

/// Substitutes, evaluates, then records the result. Memory is only touched
/// once the evaluator has answered.
pub fn evaluate<E: Evaluator>(
    state: &mut State<E>,
    name: Option<&str>,
    expression: &str,
) -> anyhow::Result<String> {
    let expression = state.memory.substitute(expression)?;
    log::debug!("evaluating {:?}", expression);
    let result = eval::calculate(&mut state.evaluator, &expression)?;

    state.memory.update_last(result.as_str());
    let name = state.memory.store(name, result.as_str());
    Ok(format!("  ${} = {}", name, result))
}
