use crate::auth::{permissions::role_defaults, AccessLevel, Action};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub level: Option<AccessLevel>,
}

fn render(level: AccessLevel) -> Vec<String> {
    if level == AccessLevel::SuperAdmin {
        return vec![format!("{level}: every module, every action")];
    }

    role_defaults(level)
        .iter()
        .map(|(module, actions)| {
            let actions: Vec<&str> = actions.iter().copied().map(Action::as_str).collect();
            format!("{level}  {:<18} {}", module.as_str(), actions.join(", "))
        })
        .collect()
}

/// Print the role-default permission table.
/// # Errors
/// Never fails; the signature matches the other actions.
pub fn execute(args: &Args) -> Result<()> {
    let levels = match args.level {
        Some(level) => vec![level],
        None => AccessLevel::ALL.to_vec(),
    };

    for level in levels {
        for line in render(level) {
            println!("{line}");
        }
    }

    Ok(())
}
