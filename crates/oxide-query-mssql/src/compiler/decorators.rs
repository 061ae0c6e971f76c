//! Decorator stack.
//!
//! Decorators are read in reverse: each one emits its opening text right
//! away and pushes its closing text onto a stack, then the base text is
//! written once and the stack is unwound. For `[A, B]` around `t` this
//! yields `B(A(t))`. The decorator list itself is never modified.

use oxide_query_core::dialect::Dialect;
use oxide_query_core::model::{param, CastType, Decorator, DecoratorArg, DecoratorKind};
use oxide_query_core::{CompileError, Result};

use super::Compiler;

impl Compiler<'_> {
    pub(super) fn apply_decorators(&self, base: &str, decorators: &[Decorator]) -> Result<String> {
        let mut sql = String::new();
        let mut closers: Vec<String> = Vec::with_capacity(decorators.len());

        for decorator in decorators.iter().rev() {
            let (open, close) = self.decorator_parts(decorator)?;
            sql.push_str(&open);
            closers.push(close);
        }

        sql.push_str(base);
        while let Some(close) = closers.pop() {
            sql.push_str(&close);
        }
        Ok(sql)
    }

    fn decorator_parts(&self, decorator: &Decorator) -> Result<(String, String)> {
        let name = decorator.kind.sql_name();
        let wrap = |open: &str, close: &str| -> Result<(String, String)> {
            Ok((String::from(open), String::from(close)))
        };

        match decorator.kind {
            DecoratorKind::Lower
            | DecoratorKind::Upper
            | DecoratorKind::LTrim
            | DecoratorKind::RTrim
            | DecoratorKind::Length
            | DecoratorKind::Avg
            | DecoratorKind::Count
            | DecoratorKind::Max
            | DecoratorKind::Min
            | DecoratorKind::StdDev
            | DecoratorKind::Sum
            | DecoratorKind::Var => Ok((format!("{name}("), String::from(")"))),
            DecoratorKind::Trim => wrap("LTRIM(RTRIM(", "))"),
            DecoratorKind::Date => wrap("DATEADD(dd, 0, DATEDIFF(dd, 0, ", "))"),
            DecoratorKind::Substring => {
                let start = int_param(decorator, param::START)?.unwrap_or(1);
                let length = required_int(decorator, param::LENGTH)?;
                Ok((String::from("SUBSTRING("), format!(", {start}, {length})")))
            }
            DecoratorKind::Coalesce => {
                let expressions = required_text(decorator, param::EXPRESSIONS)?;
                Ok((String::from("COALESCE("), format!(", {expressions})")))
            }
            DecoratorKind::Round => {
                let digits = required_int(decorator, param::DIGITS)?;
                Ok((String::from("ROUND("), format!(", {digits})")))
            }
            DecoratorKind::DatePart => {
                let unit = required_text(decorator, param::UNIT)?;
                if !unit.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    return Err(CompileError::InvalidDecoratorParameter {
                        decorator: name,
                        parameter: param::UNIT,
                        reason: format!("'{unit}' is not a date part"),
                    });
                }
                Ok((format!("DATEPART({unit}, "), String::from(")")))
            }
            DecoratorKind::Cast => {
                let target = self.cast_target(decorator)?;
                Ok((String::from("CAST("), format!(" AS {target})")))
            }
        }
    }

    /// Native type keyword plus any length or precision suffix.
    fn cast_target(&self, decorator: &Decorator) -> Result<String> {
        let cast = match decorator.param(param::TYPE) {
            Some(DecoratorArg::Cast(cast)) => *cast,
            Some(DecoratorArg::Text(text)) => {
                text.parse::<CastType>()
                    .map_err(|_| CompileError::UnmappedCastType {
                        cast: text.clone(),
                        dialect: self.dialect.name(),
                    })?
            }
            Some(DecoratorArg::Int(_)) => {
                return Err(invalid(decorator, param::TYPE, "expected a cast type"));
            }
            None => return Err(missing(decorator, param::TYPE)),
        };
        let native = self
            .dialect
            .cast_type_name(cast)
            .ok_or_else(|| CompileError::UnmappedCastType {
                cast: cast.to_string(),
                dialect: self.dialect.name(),
            })?;

        let length = match decorator.param(param::LENGTH) {
            Some(DecoratorArg::Int(n)) if *n > 0 => Some(n.to_string()),
            Some(DecoratorArg::Text(t)) if t.eq_ignore_ascii_case("max") => Some(String::from("max")),
            Some(_) => return Err(invalid(decorator, param::LENGTH, "expected a positive length or 'max'")),
            None => None,
        };
        let precision = int_param(decorator, param::PRECISION)?;
        let scale = int_param(decorator, param::SCALE)?;

        Ok(match (length, precision, scale) {
            (Some(length), None, None) => format!("{native}({length})"),
            (Some(_), _, _) => {
                return Err(invalid(
                    decorator,
                    param::LENGTH,
                    "cannot be combined with precision or scale",
                ))
            }
            (None, Some(precision), Some(scale)) => format!("{native}({precision}, {scale})"),
            (None, Some(precision), None) => format!("{native}({precision})"),
            (None, None, Some(_)) => return Err(missing(decorator, param::PRECISION)),
            (None, None, None) => String::from(native),
        })
    }
}

fn missing(decorator: &Decorator, parameter: &'static str) -> CompileError {
    CompileError::MissingDecoratorParameter {
        decorator: decorator.kind.sql_name(),
        parameter,
    }
}

fn invalid(decorator: &Decorator, parameter: &'static str, reason: &str) -> CompileError {
    CompileError::InvalidDecoratorParameter {
        decorator: decorator.kind.sql_name(),
        parameter,
        reason: String::from(reason),
    }
}

fn int_param(decorator: &Decorator, key: &'static str) -> Result<Option<i64>> {
    match decorator.param(key) {
        Some(DecoratorArg::Int(n)) => Ok(Some(*n)),
        Some(_) => Err(invalid(decorator, key, "expected an integer")),
        None => Ok(None),
    }
}

fn required_int(decorator: &Decorator, key: &'static str) -> Result<i64> {
    int_param(decorator, key)?.ok_or_else(|| missing(decorator, key))
}

fn required_text<'d>(decorator: &'d Decorator, key: &'static str) -> Result<&'d str> {
    match decorator.param(key) {
        Some(DecoratorArg::Text(text)) if !text.is_empty() => Ok(text),
        Some(_) => Err(invalid(decorator, key, "expected non-empty text")),
        None => Err(missing(decorator, key)),
    }
}

#[cfg(test)]
mod tests {
    use oxide_query_core::NoLookup;

    use super::*;

    fn render(decorators: &[Decorator]) -> Result<String> {
        Compiler::new(&NoLookup).apply_decorators("x", decorators)
    }

    fn kind(kind: DecoratorKind) -> Decorator {
        Decorator::new(kind)
    }

    #[test]
    fn test_last_listed_wraps_outermost() {
        let trim = kind(DecoratorKind::Trim);
        let upper = kind(DecoratorKind::Upper);
        let substring = Decorator::substring(Some(2), 3);

        assert_eq!(
            render(&[trim.clone(), upper.clone()]).unwrap(),
            "UPPER(LTRIM(RTRIM(x)))"
        );
        assert_eq!(
            render(&[upper.clone(), trim.clone()]).unwrap(),
            "LTRIM(RTRIM(UPPER(x)))"
        );
        assert_eq!(
            render(&[trim.clone(), substring.clone()]).unwrap(),
            "SUBSTRING(LTRIM(RTRIM(x)), 2, 3)"
        );
        assert_eq!(
            render(&[substring.clone(), trim]).unwrap(),
            "LTRIM(RTRIM(SUBSTRING(x, 2, 3)))"
        );
        assert_eq!(
            render(&[upper.clone(), substring.clone()]).unwrap(),
            "SUBSTRING(UPPER(x), 2, 3)"
        );
        assert_eq!(render(&[substring, upper]).unwrap(), "UPPER(SUBSTRING(x, 2, 3))");
    }

    #[test]
    fn test_render_leaves_list_untouched() {
        let decorators = vec![kind(DecoratorKind::Lower), kind(DecoratorKind::Max)];
        let first = render(&decorators).unwrap();
        let second = render(&decorators).unwrap();
        assert_eq!(first, "MAX(LOWER(x))");
        assert_eq!(first, second);
        assert_eq!(decorators[0].kind, DecoratorKind::Lower);
    }

    #[test]
    fn test_parameterized_decorators() {
        assert_eq!(render(&[Decorator::substring(None, 5)]).unwrap(), "SUBSTRING(x, 1, 5)");
        assert_eq!(render(&[Decorator::round(2)]).unwrap(), "ROUND(x, 2)");
        assert_eq!(render(&[Decorator::coalesce("'n/a'")]).unwrap(), "COALESCE(x, 'n/a')");
        assert_eq!(render(&[Decorator::date_part("year")]).unwrap(), "DATEPART(year, x)");
        assert_eq!(
            render(&[kind(DecoratorKind::Date)]).unwrap(),
            "DATEADD(dd, 0, DATEDIFF(dd, 0, x))"
        );
        assert_eq!(render(&[kind(DecoratorKind::Length)]).unwrap(), "LEN(x)");
        assert_eq!(render(&[kind(DecoratorKind::StdDev)]).unwrap(), "STDEV(x)");
    }

    #[test]
    fn test_cast_forms() {
        assert_eq!(render(&[Decorator::cast(CastType::Int32)]).unwrap(), "CAST(x AS int)");
        assert_eq!(
            render(&[Decorator::cast_with_length(CastType::String, 50)]).unwrap(),
            "CAST(x AS nvarchar(50))"
        );
        assert_eq!(
            render(&[Decorator::cast_with_precision(CastType::Decimal, 10, 2)]).unwrap(),
            "CAST(x AS decimal(10, 2))"
        );
        let max = Decorator::cast(CastType::String).with(param::LENGTH, DecoratorArg::Text(String::from("MAX")));
        assert_eq!(render(&[max]).unwrap(), "CAST(x AS nvarchar(max))");
        let by_name = Decorator::new(DecoratorKind::Cast)
            .with(param::TYPE, DecoratorArg::Text(String::from("guid")));
        assert_eq!(render(&[by_name]).unwrap(), "CAST(x AS uniqueidentifier)");
    }

    #[test]
    fn test_unmapped_cast_type_is_an_error() {
        let unknown = Decorator::new(DecoratorKind::Cast)
            .with(param::TYPE, DecoratorArg::Text(String::from("Money")));
        assert_eq!(
            render(&[unknown]).unwrap_err(),
            CompileError::UnmappedCastType {
                cast: String::from("Money"),
                dialect: "mssql"
            }
        );
    }

    #[test]
    fn test_missing_parameters() {
        assert_eq!(
            render(&[kind(DecoratorKind::Substring)]).unwrap_err(),
            CompileError::MissingDecoratorParameter {
                decorator: "SUBSTRING",
                parameter: "length"
            }
        );
        assert!(matches!(
            render(&[kind(DecoratorKind::Round)]),
            Err(CompileError::MissingDecoratorParameter { parameter: "digits", .. })
        ));
        assert!(matches!(
            render(&[kind(DecoratorKind::Cast)]),
            Err(CompileError::MissingDecoratorParameter { parameter: "type", .. })
        ));
    }

    #[test]
    fn test_date_part_unit_is_validated() {
        assert!(matches!(
            render(&[Decorator::date_part("year); DROP TABLE x; --")]),
            Err(CompileError::InvalidDecoratorParameter { parameter: "unit", .. })
        ));
    }
}
