//! Display formatting and the copy-paste caption.

use crate::core::{Classification, SemesterStats};
use crate::state::AppState;

/// Hashtag printed in the card footer.
pub const HASHTAG: &str = "#SemesterWrapped";

/// Rounded whole percent, or an en dash when the value is undefined.
pub fn format_pct(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{}%", v.round() as i64),
        _ => "–".to_string(),
    }
}

/// Truncate to at most `max` characters.
pub fn safe_text(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Trimmed handle with a leading `@`; empty input stays empty.
pub fn normalize_handle(handle: &str) -> String {
    let trimmed = handle.trim();
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{trimmed}")
    }
}

/// Fixed multi-line caption ready for the clipboard.
pub fn caption_text(state: &AppState, stats: &SemesterStats<'_>) -> String {
    let (average, classification) = if stats.is_empty() {
        ("–".to_string(), "–")
    } else {
        (
            format_pct(stats.average),
            Classification::from_average(stats.average).label(),
        )
    };
    let handle = normalize_handle(&state.linkedin_handle);
    let linkedin = if handle.is_empty() {
        "\n".to_string()
    } else {
        format!("\nLinkedIn: {handle}\n")
    };

    format!(
        "📚 {headline}\n\
         {name}\n\
         {university} • {course}\n\
         {semester} • {year}\n\
         \n\
         Results:\n\
         • Semester average: {average}\n\
         • Classification: {classification}\n\
         • Modules: {count}\n\
         {linkedin}\
         {HASHTAG} #university #students",
        headline = state.headline,
        name = state.person_name,
        university = state.university,
        course = state.course,
        semester = state.semester,
        year = state.year,
        count = stats.count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::semester_stats;
    use pretty_assertions::assert_eq;

    fn sample() -> AppState {
        AppState {
            person_name: "Ada".to_string(),
            university: "Uni".to_string(),
            course: "BSc CS".to_string(),
            semester: "Semester 2".to_string(),
            year: "Year 2 • 2025/26".to_string(),
            headline: "Wrapped".to_string(),
            ..AppState::default()
        }
    }

    #[test]
    fn pct_formatting() {
        assert_eq!(format_pct(Some(67.5)), "68%");
        assert_eq!(format_pct(Some(0.0)), "0%");
        assert_eq!(format_pct(None), "–");
        assert_eq!(format_pct(Some(f64::NAN)), "–");
    }

    #[test]
    fn handles_are_prefixed_once() {
        assert_eq!(normalize_handle("  ada  "), "@ada");
        assert_eq!(normalize_handle("@ada"), "@ada");
        assert_eq!(normalize_handle("   "), "");
    }

    #[test]
    fn safe_text_counts_characters() {
        assert_eq!(safe_text("héllo wörld", 5), "héllo");
        assert_eq!(safe_text("ok", 10), "ok");
    }

    #[test]
    fn caption_with_handle() {
        let mut state = sample();
        state.linkedin_handle = "ada".to_string();
        state.modules[0].assessments[0].mark = 70.0;
        state.modules[0].assessments[1].mark = 70.0;
        let stats = semester_stats(&state.modules);
        let caption = caption_text(&state, &stats);
        let expected = "📚 Wrapped\n\
                        Ada\n\
                        Uni • BSc CS\n\
                        Semester 2 • Year 2 • 2025/26\n\
                        \n\
                        Results:\n\
                        • Semester average: 70%\n\
                        • Classification: First Class\n\
                        • Modules: 1\n\
                        \n\
                        LinkedIn: @ada\n\
                        #SemesterWrapped #university #students";
        assert_eq!(caption, expected);
    }

    #[test]
    fn caption_without_modules_uses_placeholders() {
        let mut state = sample();
        state.modules.clear();
        let stats = semester_stats(&state.modules);
        let caption = caption_text(&state, &stats);
        assert!(caption.contains("• Semester average: –\n"));
        assert!(caption.contains("• Classification: –\n"));
        assert!(caption.contains("• Modules: 0\n\n#SemesterWrapped"));
        assert!(!caption.contains("LinkedIn"));
    }
}
