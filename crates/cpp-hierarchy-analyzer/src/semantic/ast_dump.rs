use std::sync::atomic::{AtomicU64, Ordering};

use tokio::process::Command;
use tower_lsp::lsp_types::Url;
use tracing::{debug, warn};

static NEXT_AST_DUMP_ID: AtomicU64 = AtomicU64::new(1);

/// Run Clang's JSON AST dump over a document and return the raw JSON string
/// plus the temp file paths used, so locations can be rewritten back to the
/// original URI.
///
/// A failed compile is tolerated: a recursive template that blows the
/// instantiation depth still produces a partial AST on stdout, and that
/// partial AST is exactly what hierarchy queries need.
pub(crate) async fn run_ast_dump(
    source: &str,
    uri: &Url,
    clang_path: &str,
    include_paths: &[String],
    extra_flags: &[String],
) -> Option<(String, Vec<String>)> {
    // Always use a temp directory under system temp and a unique filename.
    // This avoids creating sidecar files next to real source files.
    let tmp_dir = std::env::temp_dir().join(format!("cpp-hierarchy-{}", std::process::id()));
    if std::fs::create_dir_all(&tmp_dir).is_err() {
        warn!("Failed to create temp dir for AST dump");
        return None;
    }

    let compilation_id = NEXT_AST_DUMP_ID.fetch_add(1, Ordering::Relaxed);
    let src_file = tmp_dir.join(format!("tu-{compilation_id}.cpp"));

    if tokio::fs::write(&src_file, source).await.is_err() {
        warn!("Failed to write temp file for AST dump");
        let _ = std::fs::remove_dir(&tmp_dir);
        return None;
    }

    let mut args = vec![
        "-Xclang".to_string(),
        "-ast-dump=json".to_string(),
        "-fsyntax-only".to_string(),
        "-fno-color-diagnostics".to_string(),
        src_file.display().to_string(),
    ];

    let mut seen_includes = std::collections::HashSet::with_capacity(include_paths.len() + 4);
    for p in include_paths {
        if seen_includes.insert(p.clone()) {
            args.push("-I".to_string());
            args.push(p.clone());
        }
    }

    // Headers next to the original file must stay reachable even though the
    // temp copy lives under /tmp.
    if let Ok(file_path) = uri.to_file_path()
        && let Some(parent) = file_path.parent()
    {
        let dir = parent.display().to_string();
        if seen_includes.insert(dir.clone()) {
            args.push("-I".to_string());
            args.push(dir);
        }
    }

    args.extend(extra_flags.iter().cloned());

    debug!("AST dump: {clang_path} {}", args.join(" "));

    let mut command = Command::new(clang_path);
    command.kill_on_drop(true).args(&args);
    let output = match command.output().await {
        Ok(o) => o,
        Err(e) => {
            warn!("Failed to run AST dump via {clang_path}: {e}");
            return None;
        },
    };

    // Capture the temp source file path used for the dump so locations can
    // be rewritten back to the original URI.
    //
    // Note: we intentionally do this *before* cleanup.
    let raw_tmp_file = src_file.display().to_string();
    let canonical_tmp_file = std::fs::canonicalize(&src_file).ok().map(|p| p.display().to_string());
    let mut tmp_files = vec![raw_tmp_file];
    if let Some(canon) = canonical_tmp_file
        && !tmp_files.contains(&canon)
    {
        tmp_files.push(canon);
    }

    let _ = tokio::fs::remove_file(&src_file).await;
    let _ = tokio::fs::remove_dir(&tmp_dir).await;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stderr.lines() {
            if line.contains("error:") {
                warn!("[ast-dump] compiler error: {line}");
            }
        }
        debug!("[ast-dump] exited with non-zero status (partial AST may still be usable)");
    }

    let stdout = String::from_utf8(output.stdout).ok()?;
    if stdout.is_empty() || !stdout.starts_with('{') {
        warn!("[ast-dump] produced no usable JSON for {uri}");
        return None;
    }

    debug!("[ast-dump] produced {} bytes of JSON for {uri}", stdout.len());

    Some((stdout, tmp_files))
}
