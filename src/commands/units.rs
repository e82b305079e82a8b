//! # units 命令实现
//!
//! 通过共享单位注册表解析物理量表达式并换算。
//!
//! ## 依赖关系
//! - 使用 `cli/units.rs` 定义的参数
//! - 使用 `cslib::units`
//! - 使用 `utils/output.rs`

use crate::cli::units::{ConvertArgs, InfoArgs, UnitsArgs, UnitsCommands};
use crate::utils::output;
use cslib::error::Result;
use cslib::units::{units, Quantity};

/// 执行 units 命令
pub fn execute(args: UnitsArgs) -> Result<()> {
    match args.command {
        UnitsCommands::Convert(args) => convert(&args),
        UnitsCommands::Info(args) => info(&args),
    }
}

/// 换算到目标单位
fn convert_quantity(expr: &str, target: &str) -> Result<Quantity> {
    let quantity = units().parse_expression(expr)?;
    let target = units().parse_units(target)?;
    quantity.to(&target)
}

fn convert(args: &ConvertArgs) -> Result<()> {
    let result = convert_quantity(&args.expr, &args.target)?;
    let text = if args.short {
        result.abbreviated()
    } else {
        result.to_string()
    };
    output::print_conversion(&args.expr, &text);
    Ok(())
}

fn info(args: &InfoArgs) -> Result<()> {
    let quantity = units().parse_expression(&args.expr)?;
    let base = quantity.to_base_units();

    output::print_header(&format!("Quantity '{}'", args.expr));
    output::print_field("Magnitude", &format!("{:?}", quantity.magnitude()));
    output::print_field("Units", &quantity.units().to_string());
    output::print_field("Symbol", &quantity.units().abbreviated());
    output::print_field("Dimensionality", &quantity.dimensionality().to_string());
    output::print_field("Base units", &base.to_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_quantity() {
        let q = convert_quantity("41 angstrom", "nm").unwrap();
        assert!((q.magnitude() - 4.1).abs() < 1e-12);
        assert_eq!(q.units().abbreviated(), "nm");
    }

    #[test]
    fn test_convert_rejects_other_dimensionality() {
        assert!(convert_quantity("3 eV", "m").is_err());
        assert!(convert_quantity("3 flurbs", "m").is_err());
    }
}
