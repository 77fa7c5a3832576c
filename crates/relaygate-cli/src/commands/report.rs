use crate::cli::ReportFormatArg;
use crate::support::{fail, load_config_or_exit, write_output_or_exit};
use relaygate_engine::{WizardReport, read_json_file};

pub fn run(config: String, format: ReportFormatArg, out: Option<String>) {
    let config = load_config_or_exit(&config);
    let path = config.report_path();
    let report: WizardReport = read_json_file(&path)
        .unwrap_or_else(|e| fail(e))
        .unwrap_or_else(|| {
            fail(format!(
                "no wizard report at {}; run setup, autofix or verify first",
                path.display()
            ))
        });

    let text = match format {
        ReportFormatArg::Json => match report
            .to_json_document()
            .and_then(|document| serde_json::to_string_pretty(&document))
        {
            Ok(text) => format!("{text}\n"),
            Err(e) => fail(format!("failed to render json: {e}")),
        },
        ReportFormatArg::Markdown => report.render_markdown(),
    };
    write_output_or_exit(out.as_deref(), &text);
}
