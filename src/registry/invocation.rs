// Task invocation parsing
//
// Supports: "deploy:v2,force=yes,hosts=web1;web2,exclude_hosts=web3"
// - positional and keyword arguments are comma separated
// - `\,` and `\=` escape a literal comma or equals sign
// - host, hosts, role, roles, exclude_hosts are pulled out of the keyword arguments

use std::collections::BTreeMap;

use crate::output::errors::RosterError;

/// A task name with its parsed arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskInvocation {
    pub name: String,
    pub args: Vec<String>,
    pub kwargs: BTreeMap<String, String>,
    pub hosts: Vec<String>,
    pub roles: Vec<String>,
    pub exclude_hosts: Vec<String>,
}

/// Keyword arguments with host selection split out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskKwargs {
    pub kwargs: BTreeMap<String, String>,
    pub hosts: Vec<String>,
    pub roles: Vec<String>,
    pub exclude_hosts: Vec<String>,
}

/// Parse a `name:arg,key=value` invocation string
pub fn parse_invocation(input: &str) -> Result<TaskInvocation, RosterError> {
    let (name, argstr) = match input.split_once(':') {
        Some((name, argstr)) => (name.trim(), Some(argstr)),
        None => (input.trim(), None),
    };

    if name.is_empty() {
        return Err(RosterError::Args {
            message: format!("Missing task name in '{}'", input),
        });
    }

    let mut args = Vec::new();
    let mut raw_kwargs = BTreeMap::new();

    if let Some(argstr) = argstr {
        for pair in escape_split(',', argstr, None) {
            if pair.is_empty() {
                continue;
            }
            let parts = escape_split('=', &pair, Some(1));
            match parts.as_slice() {
                [key, value] => {
                    let key = key.trim();
                    if key.is_empty() {
                        return Err(RosterError::Args {
                            message: format!("Empty keyword in argument '{}'", pair),
                        });
                    }
                    raw_kwargs.insert(key.to_string(), value.clone());
                }
                [value] => args.push(value.clone()),
                _ => {}
            }
        }
    }

    let split = parse_kwargs(raw_kwargs);

    Ok(TaskInvocation {
        name: name.to_string(),
        args,
        kwargs: split.kwargs,
        hosts: split.hosts,
        roles: split.roles,
        exclude_hosts: split.exclude_hosts,
    })
}

/// Separate host selection keywords from the task's own keyword arguments.
///
/// `host` and `role` take a single value; `hosts`, `roles`, and
/// `exclude_hosts` take a `;`-separated list.
pub fn parse_kwargs(kwargs: BTreeMap<String, String>) -> TaskKwargs {
    let mut result = TaskKwargs::default();

    for (key, value) in kwargs {
        match key.as_str() {
            "host" => result.hosts = vec![value.trim().to_string()],
            "hosts" => result.hosts = split_semicolons(&value),
            "role" => result.roles = vec![value.trim().to_string()],
            "roles" => result.roles = split_semicolons(&value),
            "exclude_hosts" => result.exclude_hosts = split_semicolons(&value),
            _ => {
                result.kwargs.insert(key, value);
            }
        }
    }

    result
}

fn split_semicolons(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Split on `sep` unless preceded by a backslash, at most `limit` times
fn escape_split(sep: char, input: &str, limit: Option<usize>) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let splits_left = limit.map_or(true, |l| parts.len() < l);

        if c == '\\' && chars.peek() == Some(&sep) {
            current.push(sep);
            chars.next();
        } else if c == sep && splits_left {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(c);
        }
    }
    parts.push(current);

    parts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bare_task_name() {
        let inv = parse_invocation("deploy").unwrap();
        assert_eq!(inv.name, "deploy");
        assert!(inv.args.is_empty());
        assert!(inv.kwargs.is_empty());
        assert!(inv.hosts.is_empty());
    }

    #[test]
    fn test_args_and_host_kwargs() {
        let inv = parse_invocation(
            "db.migrate:v2,force=yes,hosts=web1; web2,roles=db,exclude_hosts=web2",
        )
        .unwrap();

        assert_eq!(inv.name, "db.migrate");
        assert_eq!(inv.args, vec!["v2"]);
        assert_eq!(inv.kwargs.get("force").map(String::as_str), Some("yes"));
        assert_eq!(inv.kwargs.len(), 1);
        assert_eq!(inv.hosts, vec!["web1", "web2"]);
        assert_eq!(inv.roles, vec!["db"]);
        assert_eq!(inv.exclude_hosts, vec!["web2"]);
    }

    #[test]
    fn test_single_host_and_role() {
        let inv = parse_invocation("restart:host= web1 ,role=cache").unwrap();
        assert_eq!(inv.hosts, vec!["web1"]);
        assert_eq!(inv.roles, vec!["cache"]);
    }

    #[test]
    fn test_escaped_separators() {
        let inv = parse_invocation(r"echo:a\,b,msg=x\=y,expr=k=v").unwrap();
        assert_eq!(inv.args, vec!["a,b"]);
        assert_eq!(inv.kwargs.get("msg").map(String::as_str), Some("x=y"));
        assert_eq!(inv.kwargs.get("expr").map(String::as_str), Some("k=v"));
    }

    #[test]
    fn test_missing_name() {
        let err = parse_invocation(":hosts=a").unwrap_err();
        assert!(matches!(err, RosterError::Args { .. }));
    }

    #[test]
    fn test_empty_keyword() {
        let err = parse_invocation("deploy:=x").unwrap_err();
        assert!(err.message().contains("Empty keyword"));
    }

    #[test]
    fn test_parse_kwargs_passes_other_keys_through() {
        let mut kwargs = BTreeMap::new();
        kwargs.insert("hosts".to_string(), "a;b;".to_string());
        kwargs.insert("tag".to_string(), "v1".to_string());

        let split = parse_kwargs(kwargs);
        assert_eq!(split.hosts, vec!["a", "b"]);
        assert!(split.roles.is_empty());
        assert!(split.exclude_hosts.is_empty());
        assert_eq!(split.kwargs.get("tag").map(String::as_str), Some("v1"));
    }

    #[test]
    fn test_escape_split() {
        assert_eq!(escape_split(',', "a,b", None), vec!["a", "b"]);
        assert_eq!(escape_split(',', r"a\,b", None), vec!["a,b"]);
        assert_eq!(escape_split('=', "a=b=c", Some(1)), vec!["a", "b=c"]);
        assert_eq!(escape_split(',', "", None), vec![""]);
    }
}
