//! Embedded WGSL sources and `#include` resolution.
//!
//! Shaders are compiled into the binary with `include_str!` so no runtime
//! path lookup is needed. `#include "file.wgsl"` lines are replaced with the
//! named embedded file; each file is expanded once per top-level shader.

use rustc_hash::FxHashSet;

use crate::error::{SolverError, SolverResult};

pub const FULLSCREEN_WGSL: &str = include_str!("shaders/fullscreen.wgsl");
pub const BOUNDARY_WGSL: &str = include_str!("shaders/boundary.wgsl");
pub const TENDENCY_WGSL: &str = include_str!("shaders/tendency.wgsl");
pub const STAGE_WGSL: &str = include_str!("shaders/stage.wgsl");
pub const INJECT_WGSL: &str = include_str!("shaders/inject.wgsl");

/// Embedded shader file by name
pub fn embedded_source(name: &str) -> Option<&'static str> {
    match name {
        "fullscreen.wgsl" => Some(FULLSCREEN_WGSL),
        "boundary.wgsl" => Some(BOUNDARY_WGSL),
        "tendency.wgsl" => Some(TENDENCY_WGSL),
        "stage.wgsl" => Some(STAGE_WGSL),
        "inject.wgsl" => Some(INJECT_WGSL),
        _ => None,
    }
}

/// Fully expanded source of the embedded shader `name`
pub fn resolve(name: &str) -> SolverResult<String> {
    let source = embedded_source(name)
        .ok_or_else(|| SolverError::ShaderPreprocess(format!("unknown shader '{}'", name)))?;
    let mut seen = FxHashSet::default();
    seen.insert(name.to_string());
    let mut output = String::with_capacity(source.len() * 2);
    expand(source, &mut seen, &mut output)?;
    Ok(output)
}

fn expand(content: &str, seen: &mut FxHashSet<String>, output: &mut String) -> SolverResult<()> {
    for line in content.lines() {
        let Some(include) = parse_include_directive(line) else {
            output.push_str(line);
            output.push('\n');
            continue;
        };

        if !seen.insert(include.to_string()) {
            output.push_str("// Skipped repeated include: ");
            output.push_str(include);
            output.push('\n');
            continue;
        }

        let included = embedded_source(include).ok_or_else(|| {
            SolverError::ShaderPreprocess(format!("could not find include file: {}", include))
        })?;
        output.push_str("// Begin include: ");
        output.push_str(include);
        output.push('\n');
        expand(included, seen, output)?;
        output.push_str("// End include: ");
        output.push_str(include);
        output.push('\n');
    }
    Ok(())
}

/// `#include "file.wgsl"` or `#include <file.wgsl>`
fn parse_include_directive(line: &str) -> Option<&str> {
    let rest = line.trim().strip_prefix("#include")?.trim();
    rest.strip_prefix('"')
        .and_then(|r| r.strip_suffix('"'))
        .or_else(|| rest.strip_prefix('<').and_then(|r| r.strip_suffix('>')))
}
