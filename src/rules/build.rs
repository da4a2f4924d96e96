//! DF1xxx / DF2xxx - Dockerfile rules.
//!
//! Line-oriented checks over Dockerfile text plus image tag validation.
//! Matching is substring based and intentionally loose.

use crate::types::{Finding, Severity, Subject};

const MAX_TAG_LENGTH: usize = 128;
const INVALID_TAG_CHARS: [char; 5] = ['/', ':', ' ', '\t', '\n'];
const OCI_LABELS: [&str; 4] = [
    "org.opencontainers.image.title",
    "org.opencontainers.image.description",
    "org.opencontainers.image.version",
    "org.opencontainers.image.source",
];

/// One logical Dockerfile instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// 1-indexed physical line the instruction starts on.
    pub line_number: u32,
    /// Instruction text. Continuation lines are joined by [`tokenize`].
    pub text: String,
}

impl Instruction {
    pub fn new(line_number: u32, text: impl Into<String>) -> Self {
        Self {
            line_number,
            text: text.into(),
        }
    }

    /// The instruction keyword, uppercased.
    pub fn keyword(&self) -> String {
        self.text
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_uppercase()
    }

    /// Arguments after the keyword, split on whitespace.
    pub fn arguments(&self) -> impl Iterator<Item = &str> {
        self.text.split_whitespace().skip(1)
    }

    pub fn is(&self, keyword: &str) -> bool {
        self.keyword() == keyword
    }
}

/// Split Dockerfile text into instructions.
///
/// Blank lines and `#` comments are dropped. A trailing `\` joins the next
/// line into the same instruction, which keeps the first line's number.
pub fn tokenize(content: &str) -> Vec<Instruction> {
    let mut instructions = Vec::new();
    let mut pending: Option<Instruction> = None;

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (body, continues) = match line.strip_suffix('\\') {
            Some(body) => (body.trim_end(), true),
            None => (line, false),
        };

        let current = match pending.take() {
            Some(mut inst) => {
                if !body.is_empty() {
                    inst.text.push(' ');
                    inst.text.push_str(body);
                }
                inst
            }
            None => Instruction::new(idx as u32 + 1, body),
        };

        if continues {
            pending = Some(current);
        } else {
            instructions.push(current);
        }
    }

    if let Some(inst) = pending {
        instructions.push(inst);
    }

    instructions
}

/// Stripped non-blank, non-comment lines, one per physical line.
///
/// Continuations are not joined, so each line of a multi-line `RUN` is
/// checked on its own.
pub fn physical_lines(content: &str) -> Vec<Instruction> {
    content
        .lines()
        .enumerate()
        .map(|(idx, raw)| (idx, raw.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(idx, line)| Instruction::new(idx as u32 + 1, line))
        .collect()
}

/// Check instruction order and a few well-known security mistakes.
///
/// Works line by line: a flag on a continuation line does not excuse the
/// line that starts the instruction.
pub fn validate_instructions(content: &str, subject: &Subject) -> Vec<Finding> {
    let instructions = physical_lines(content);
    let Some(first) = instructions.first() else {
        return vec![Finding::new(
            "DF1001",
            Severity::Error,
            subject,
            "Dockerfile is empty",
        )];
    };

    let mut failures = Vec::new();

    if !first.text.to_uppercase().starts_with("FROM") {
        failures.push(
            Finding::new(
                "DF1002",
                Severity::Error,
                subject,
                "First instruction should be FROM",
            )
            .on_line(first.line_number),
        );
    }

    for inst in &instructions {
        let upper = inst.text.to_uppercase();
        let lower = inst.text.to_lowercase();

        if upper.starts_with("USER ROOT") {
            failures.push(
                Finding::new("DF1003", Severity::Error, subject, "Running as root user")
                    .on_line(inst.line_number),
            );
        }

        if upper.starts_with("ADD ") && !lower.contains("http") {
            failures.push(
                Finding::new(
                    "DF1004",
                    Severity::Error,
                    subject,
                    "Use COPY instead of ADD for local files",
                )
                .on_line(inst.line_number),
            );
        }

        if lower.contains("pip install") && !lower.contains("--no-cache-dir") {
            failures.push(
                Finding::new(
                    "DF1005",
                    Severity::Error,
                    subject,
                    "pip install should use --no-cache-dir",
                )
                .on_line(inst.line_number),
            );
        }
    }

    failures
}

/// Advisory best-practice checks: WORKDIR, USER, build context paths,
/// multi-stage builds and OCI labels.
pub fn check_best_practices(content: &str, subject: &Subject) -> Vec<Finding> {
    let instructions = tokenize(content);
    let mut failures = Vec::new();

    if instructions.is_empty() {
        return failures;
    }

    if !instructions.iter().any(|i| i.is("WORKDIR")) {
        failures.push(Finding::new(
            "DF1006",
            Severity::Warning,
            subject,
            "Dockerfile should set WORKDIR",
        ));
    }

    if !instructions.iter().any(|i| i.is("USER")) {
        failures.push(Finding::new(
            "DF1007",
            Severity::Warning,
            subject,
            "Dockerfile doesn't set USER (run as a non-root user)",
        ));
    }

    for inst in instructions.iter().filter(|i| i.is("COPY") || i.is("ADD")) {
        // Sources copied from another stage or image are not build context paths.
        if inst.arguments().any(|arg| arg.starts_with("--from")) {
            continue;
        }
        let source = inst.arguments().find(|arg| !arg.starts_with("--"));
        if let Some(source) = source.filter(|s| s.starts_with('/')) {
            failures.push(
                Finding::new(
                    "DF1008",
                    Severity::Warning,
                    subject,
                    format!("Absolute path in {} instruction: {}", inst.keyword(), source),
                )
                .on_line(inst.line_number),
            );
        }
    }

    let stages = instructions.iter().filter(|i| i.is("FROM")).count();
    if stages == 1 {
        failures.push(Finding::new(
            "DF1009",
            Severity::Info,
            subject,
            "Single-stage build (consider multi-stage for smaller images)",
        ));
    }

    let labels: Vec<&str> = instructions
        .iter()
        .filter(|i| i.is("LABEL"))
        .map(|i| i.text.as_str())
        .collect();
    if labels.is_empty() {
        failures.push(Finding::new(
            "DF1010",
            Severity::Warning,
            subject,
            "No LABEL instructions (metadata recommended)",
        ));
    } else {
        for label in OCI_LABELS {
            if !labels.iter().any(|text| text.contains(label)) {
                failures.push(Finding::new(
                    "DF1011",
                    Severity::Info,
                    subject,
                    format!("Missing recommended label: {}", label),
                ));
            }
        }
    }

    failures
}

/// Tags of every `FROM` image that names one, with the instruction line.
///
/// Images without a tag, digests-only references, `scratch` and images
/// built from build arguments are skipped.
pub fn from_image_tags(content: &str) -> Vec<(u32, String)> {
    tokenize(content)
        .iter()
        .filter(|i| i.is("FROM"))
        .filter_map(|inst| {
            let image = inst.arguments().find(|arg| !arg.starts_with("--"))?;
            if image.contains('$') {
                return None;
            }
            let image = image.split('@').next().unwrap_or_default();
            let name = image.rsplit('/').next().unwrap_or_default();
            let (_, tag) = name.split_once(':')?;
            Some((inst.line_number, tag.to_string()))
        })
        .collect()
}

/// Validate an image tag.
///
/// Each invalid character kind is reported once.
pub fn validate_image_tag(tag: &str, subject: &Subject) -> Vec<Finding> {
    if tag.is_empty() {
        return vec![Finding::new(
            "DF2001",
            Severity::Error,
            subject,
            "Image tag is empty",
        )];
    }

    let mut failures = Vec::new();

    if tag == "latest" {
        failures.push(Finding::new(
            "DF2002",
            Severity::Warning,
            subject,
            "Using \"latest\" tag is not recommended for production",
        ));
    }

    let length = tag.chars().count();
    if length > MAX_TAG_LENGTH {
        failures.push(Finding::new(
            "DF2003",
            Severity::Error,
            subject,
            format!("Tag too long: {} > {}", length, MAX_TAG_LENGTH),
        ));
    }

    for c in INVALID_TAG_CHARS.iter().filter(|c| tag.contains(**c)) {
        failures.push(Finding::new(
            "DF2004",
            Severity::Error,
            subject,
            format!("Tag contains invalid character: {}", c.escape_debug()),
        ));
    }

    failures
}
