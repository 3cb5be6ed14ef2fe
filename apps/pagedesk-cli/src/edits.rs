//! Turn `edit` flags into page commands

use anyhow::{bail, Context, Result};
use pdfedit_core::{parse_commands, PageCommand};
use std::path::Path;

/// `--order 3,1,2`: 1-based positions, listed in their new order
pub fn parse_order(raw: &str) -> Result<PageCommand> {
    let order = raw
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| -> Result<usize> {
            let position: usize = part
                .parse()
                .with_context(|| format!("invalid position in --order: {}", part))?;
            if position == 0 {
                bail!("--order positions start at 1");
            }
            Ok(position - 1)
        })
        .collect::<Result<Vec<_>>>()?;

    if order.is_empty() {
        bail!("--order is empty");
    }
    Ok(PageCommand::Reorder { order })
}

/// `--rotate 2:90`: 1-based position and degrees
pub fn parse_rotation(raw: &str) -> Result<PageCommand> {
    let (position, degrees) = raw
        .split_once(':')
        .with_context(|| format!("expected POSITION:DEGREES, got {}", raw))?;
    let position: usize = position
        .trim()
        .parse()
        .with_context(|| format!("invalid position in --rotate: {}", position))?;
    let degrees: i32 = degrees
        .trim()
        .parse()
        .with_context(|| format!("invalid degrees in --rotate: {}", degrees))?;

    if position == 0 {
        bail!("--rotate positions start at 1");
    }
    Ok(PageCommand::Rotate {
        position: position - 1,
        degrees,
    })
}

/// Flags apply as reorder, then rotations, then deletion. Rotation and
/// deletion positions refer to the reordered layout. A commands file runs last.
pub fn build_commands(
    order: Option<&str>,
    rotations: &[String],
    delete: Option<&str>,
    commands_file: Option<&Path>,
) -> Result<Vec<PageCommand>> {
    let mut commands = Vec::new();

    if let Some(order) = order {
        commands.push(parse_order(order)?);
    }
    for rotation in rotations {
        commands.push(parse_rotation(rotation)?);
    }
    if let Some(range) = delete {
        commands.push(PageCommand::DeleteRange {
            range: range.to_string(),
        });
    }
    if let Some(path) = commands_file {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        commands.extend(parse_commands(&json)?);
    }

    Ok(commands)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_parse_order_is_one_based() {
        assert_eq!(
            parse_order("3, 1,2").unwrap(),
            PageCommand::Reorder {
                order: vec![2, 0, 1]
            }
        );
        assert!(parse_order("0,1").is_err());
        assert!(parse_order("a").is_err());
        assert!(parse_order(" , ").is_err());
    }

    #[test]
    fn test_parse_rotation() {
        assert_eq!(
            parse_rotation("2:-90").unwrap(),
            PageCommand::Rotate {
                position: 1,
                degrees: -90
            }
        );
        assert!(parse_rotation("2").is_err());
        assert!(parse_rotation("0:90").is_err());
    }

    #[test]
    fn test_build_commands_order() {
        let commands = build_commands(
            Some("2,1"),
            &["1:180".to_string()],
            Some("2"),
            None,
        )
        .unwrap();

        assert_eq!(
            commands,
            vec![
                PageCommand::Reorder { order: vec![1, 0] },
                PageCommand::Rotate {
                    position: 0,
                    degrees: 180
                },
                PageCommand::DeleteRange { range: "2".into() },
            ]
        );
    }

    #[test]
    fn test_build_commands_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"type":"Delete","position":0}}]"#).unwrap();

        let commands = build_commands(None, &[], None, Some(file.path())).unwrap();

        assert_eq!(commands, vec![PageCommand::Delete { position: 0 }]);
    }

    #[test]
    fn test_build_commands_rejects_bad_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        assert!(build_commands(None, &[], None, Some(file.path())).is_err());
        assert!(build_commands(None, &[], None, Some(Path::new("/nonexistent/ops.json"))).is_err());
    }
}
