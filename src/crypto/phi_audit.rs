// Log hygiene check: record payloads and generated text must never reach a
// tracing call. Only opaque ids, types and counts are allowed in log fields.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Field names and expressions that carry patient data.
    const PHI_PATTERNS: &[&str] = &[
        "doctor_name",
        "appointment_date",
        "test_types",
        "medication",
        "dosage",
        "service_description",
        "visit_details",
        "date_of_birth",
        "ssn",
        "phone",
        "address",
        "plaintext",
        "payload",
        "req.message",
        "request.message",
        "generated_text",
        "summary_text",
    ];

    const TRACING_MACROS: &[&str] = &[
        "tracing::trace!",
        "tracing::debug!",
        "tracing::info!",
        "tracing::warn!",
        "tracing::error!",
    ];

    fn rust_sources(dir: &Path, out: &mut Vec<PathBuf>) {
        let Ok(entries) = fs::read_dir(dir) else { return };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() {
                rust_sources(&path, out);
            } else if path.extension().is_some_and(|ext| ext == "rs") {
                out.push(path);
            }
        }
    }

    /// Every tracing macro invocation in `source`, joined onto one line,
    /// with the 1-based line it starts on.
    fn tracing_calls(source: &str) -> Vec<(usize, String)> {
        let lines: Vec<&str> = source.lines().map(str::trim).collect();
        let mut calls = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            if !TRACING_MACROS.iter().any(|m| lines[i].starts_with(m)) {
                i += 1;
                continue;
            }
            let start = i;
            let mut call = String::new();
            let mut depth = 0i32;
            loop {
                call.push_str(lines[i]);
                call.push(' ');
                depth += lines[i].matches('(').count() as i32;
                depth -= lines[i].matches(')').count() as i32;
                i += 1;
                if depth <= 0 || i >= lines.len() {
                    break;
                }
            }
            calls.push((start + 1, call));
        }
        calls
    }

    fn phi_in(call: &str) -> Option<&'static str> {
        PHI_PATTERNS.iter().copied().find(|p| call.contains(p))
    }

    #[test]
    fn no_phi_in_tracing_calls() {
        let src = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
        let mut files = Vec::new();
        rust_sources(&src, &mut files);
        assert!(!files.is_empty(), "no sources under {}", src.display());

        let mut violations = Vec::new();
        for file in files.iter().filter(|f| !f.ends_with("phi_audit.rs")) {
            let Ok(source) = fs::read_to_string(file) else { continue };
            for (line, call) in tracing_calls(&source) {
                if let Some(pattern) = phi_in(&call) {
                    let rel = file.strip_prefix(&src).unwrap_or(file.as_path()).display();
                    violations.push(format!("  {rel}:{line}: '{pattern}' in {call}"));
                }
            }
        }

        assert!(
            violations.is_empty(),
            "patient data in tracing calls:\n{}",
            violations.join("\n")
        );
    }

    #[test]
    fn multi_line_call_is_joined_and_flagged() {
        let source = "fn f() {\n    tracing::info!(\n        doctor = %req.doctor_name,\n        \"stored\"\n    );\n}\n";
        let calls = tracing_calls(source);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, 2);
        assert_eq!(phi_in(&calls[0].1), Some("doctor_name"));
    }

    #[test]
    fn opaque_ids_pass() {
        let source = "tracing::info!(record_id = %record_id, record_type = t.as_str(), \"stored\");";
        let calls = tracing_calls(source);
        assert_eq!(calls.len(), 1);
        assert_eq!(phi_in(&calls[0].1), None);
    }
}
