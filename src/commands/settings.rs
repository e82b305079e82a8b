//! # settings 命令实现
//!
//! 按 YAML 模型描述校验设置文件、打印模型文档、生成默认设置。
//!
//! ## 功能
//! - 单文件与目录批量校验（并行）
//! - 类型检查与必填检查
//! - 模型文档输出
//!
//! ## 依赖关系
//! - 使用 `cli/settings.rs` 定义的参数
//! - 使用 `cslib::settings`
//! - 使用 `batch/` 进行批量处理，`utils/output.rs` 输出

use crate::batch::{BatchRunner, FileCollector, ProcessResult};
use crate::cli::settings::{CheckArgs, DefaultsArgs, DocArgs, SettingsArgs, SettingsCommands};
use crate::utils::output;
use cslib::error::{CslibError, Result};
use cslib::settings::{
    default_settings, load_model, parse_to_model, raw_settings_from_yaml_str,
    settings_to_yaml_string, validate_settings, Model,
};

use std::fs;
use std::path::Path;
use std::sync::Arc;

/// 执行 settings 命令
pub fn execute(args: SettingsArgs) -> Result<()> {
    match args.command {
        SettingsCommands::Check(args) => check(&args),
        SettingsCommands::Doc(args) => doc(&args),
        SettingsCommands::Defaults(args) => defaults(&args),
    }
}

// ─────────────────────────────────────────────────────────────
// check
// ─────────────────────────────────────────────────────────────

fn check(args: &CheckArgs) -> Result<()> {
    let model = Arc::new(load_model(&args.model)?);

    if args.input.is_file() {
        output::print_info(&format!(
            "Checking '{}' against '{}'",
            args.input.display(),
            args.model.display()
        ));
        return match check_file(&args.input, &model) {
            ProcessResult::Success(msg) => {
                output::print_success(&msg);
                Ok(())
            }
            ProcessResult::Skipped(msg) => {
                output::print_skip(&msg);
                Ok(())
            }
            ProcessResult::Failed(_, err) => Err(CslibError::Other(err)),
        };
    }

    output::print_info(&format!("Batch mode: directory '{}'", args.input.display()));

    let mut collector = FileCollector::new(args.input.clone()).recursive(args.recursive);
    if let Some(pattern) = &args.pattern {
        collector = collector.with_pattern(pattern)?;
    }
    let files = collector.collect()?;

    if files.is_empty() {
        output::print_warning(&format!(
            "No settings files found under '{}'",
            args.input.display()
        ));
        return Ok(());
    }

    output::print_info(&format!("Found {} settings files", files.len()));

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(files, |file| check_file(file, &model))?;

    output::print_separator();
    output::print_done(&format!(
        "Checked {} files: {} valid, {} skipped, {} invalid",
        result.total(),
        result.success,
        result.skipped,
        result.failed
    ));

    if result.failures.is_empty() {
        return Ok(());
    }

    output::print_warning("Invalid files:");
    for (path, err) in result.failures.iter().take(10) {
        output::print_error(&format!("  {}: {}", path, err));
    }
    if result.failures.len() > 10 {
        output::print_warning(&format!("  ... and {} more", result.failures.len() - 10));
    }

    Err(CslibError::Other(format!(
        "{} of {} settings files failed validation",
        result.failed,
        result.total()
    )))
}

/// 校验单个设置文件；空文档跳过
fn check_file(path: &Path, model: &Arc<Model>) -> ProcessResult {
    let name = path.display().to_string();
    match validate_file(path, model) {
        Ok(true) => ProcessResult::Success(format!("{} is valid", name)),
        Ok(false) => ProcessResult::Skipped(format!("{} is empty", name)),
        Err(e) => ProcessResult::Failed(name, e.to_string()),
    }
}

fn validate_file(path: &Path, model: &Arc<Model>) -> Result<bool> {
    let text = fs::read_to_string(path).map_err(|e| CslibError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    let raw = raw_settings_from_yaml_str(&text)?;
    if raw.is_empty() {
        return Ok(false);
    }
    let settings = parse_to_model(model, &raw)?;
    validate_settings(&settings, model)?;
    tracing::debug!("{}: {} top-level keys valid", path.display(), settings.len());
    Ok(true)
}

// ─────────────────────────────────────────────────────────────
// doc / defaults
// ─────────────────────────────────────────────────────────────

fn doc(args: &DocArgs) -> Result<()> {
    let model = load_model(&args.model)?;
    output::print_header(&format!("Model '{}'", args.model.display()));
    println!("{}", model.display(""));
    Ok(())
}

fn defaults(args: &DefaultsArgs) -> Result<()> {
    let model = Arc::new(load_model(&args.model)?);
    let settings = default_settings(&model)?;
    let text = settings_to_yaml_string(&settings)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &text).map_err(|e| CslibError::FileWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
            output::print_success(&format!(
                "Default settings ({} keys) written to '{}'",
                settings.len(),
                path.display()
            ));
        }
        None => print!("{}", text),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cslib::settings::model_from_schema_str;
    use tempfile::TempDir;

    const SCHEMA: &str = "\
thickness:
  description: Layer thickness.
  type: length
  obligatory: true
runs:
  description: Number of runs.
  type: integer
  default: 1
";

    fn model() -> Arc<Model> {
        Arc::new(model_from_schema_str(SCHEMA).unwrap())
    }

    fn write(dir: &TempDir, name: &str, text: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_check_file_outcomes() {
        let dir = TempDir::new().unwrap();
        let good = write(&dir, "good.yaml", "thickness: 20 nm\nruns: 3\n");
        let empty = write(&dir, "empty.yaml", "~\n");
        let wrong_type = write(&dir, "wrong.yaml", "thickness: 20 nm\nruns: many\n");
        let missing = write(&dir, "missing.yaml", "runs: 3\n");
        let unknown = write(&dir, "unknown.yaml", "thickness: 20 nm\ncolour: red\n");

        let model = model();
        assert!(matches!(check_file(&good, &model), ProcessResult::Success(_)));
        assert!(matches!(check_file(&empty, &model), ProcessResult::Skipped(_)));
        assert!(matches!(check_file(&wrong_type, &model), ProcessResult::Failed(_, _)));
        assert!(matches!(check_file(&missing, &model), ProcessResult::Failed(_, _)));
        match check_file(&unknown, &model) {
            ProcessResult::Failed(_, err) => assert!(err.contains("colour")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_check_directory_reports_failures() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "model.schema", SCHEMA);
        write(&dir, "a.yaml", "thickness: 1 nm\n");
        write(&dir, "b.yaml", "thickness: 3 s\n");

        let args = CheckArgs {
            input: dir.path().to_path_buf(),
            model: schema,
            pattern: None,
            recursive: false,
            jobs: 1,
        };
        let err = check(&args).unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
    }

    #[test]
    fn test_defaults_written_to_file() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "model.schema", SCHEMA);
        let out = dir.path().join("defaults.yaml");
        defaults(&DefaultsArgs {
            model: schema,
            output: Some(out.clone()),
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "runs: 1\n");
    }
}
