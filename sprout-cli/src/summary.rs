//! Run summary printed after the issue tree has been walked.

use sprout_core::config::JiraConfig;
use sprout_core::output::{
  format_issue_key, format_issue_type, format_url, print_error, print_header, print_success, print_warning,
};
use sprout_core::walker::{CreationResult, CreationStatus, WalkReport};

/// One summary line for a result
pub fn describe(result: &CreationResult) -> String {
  let issue_type = format_issue_type(result.issue_type.jira_name());
  let mut line = match result.key.as_deref() {
    Some(key) => format!("{issue_type} {} \"{}\"", format_issue_key(key), result.summary),
    None => format!("{issue_type} \"{}\"", result.summary),
  };

  if let CreationStatus::Failed(reason) = &result.status {
    line.push_str(&format!(": {reason}"));
    if result.skipped_descendants > 0 {
      line.push_str(&format!(" ({} child issue(s) skipped)", result.skipped_descendants));
    }
  }
  line
}

/// Summary line for a created issue, followed by its browser URL
pub fn describe_created(result: &CreationResult, config: &JiraConfig) -> String {
  let line = describe(result);
  match result.key.as_deref() {
    Some(key) => format!("{line} {}", format_url(&config.browse_url(key))),
    None => line,
  }
}

/// Print every created issue, then every failure with its reason
pub fn print_summary(report: &WalkReport, config: &JiraConfig) {
  print_header("Summary");

  for result in report.results.iter().filter(|result| !result.is_failed()) {
    print_success(&describe_created(result, config));
  }

  if report.is_success() {
    print_success(&format!("Created {} issue(s)", report.created_count()));
    return;
  }

  print_header("Failures");
  for result in report.failures() {
    print_error(&describe(result));
  }

  print_warning(&format!(
    "Created {} issue(s), {} failed, {} skipped",
    report.created_count(),
    report.failure_count(),
    report.skipped_count()
  ));
}
