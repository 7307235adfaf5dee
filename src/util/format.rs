use crate::{error::RuntimeError,
            interpreter::{evaluator::core::EvalResult, value::core::Value}};

/// Renders a `%`-style format string against evaluated arguments.
///
/// Supported verbs:
/// - `%v` - the value's inspect form
/// - `%s` - strings (and anything else, via inspect)
/// - `%t` - booleans
/// - `%d` / `%g` - numbers
/// - `%f` - numbers with a precision (default 6)
/// - `%_` - the value's type name
/// - `%%` - a literal percent sign
///
/// Flags `-` (left align) and `0` (zero pad) plus a numeric width are
/// honored; precision applies to `%f`.
///
/// # Example
/// ```
/// use magpie::{interpreter::value::core::Value, util::format::sprintf};
///
/// let rendered = sprintf(1,
///                        "%s is %.2f wide",
///                        &[Value::from("gate"), Value::Number(1.257)]).unwrap();
/// assert_eq!(rendered, "gate is 1.26 wide");
/// ```
pub fn sprintf(line: usize, format: &str, args: &[Value]) -> EvalResult<String> {
    let mut out = String::with_capacity(format.len());
    let mut chars = format.chars().peekable();
    let mut next_arg = 0;

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let mut left_align = false;
        let mut zero_pad = false;
        while let Some(flag) = chars.peek().copied() {
            match flag {
                '-' => left_align = true,
                '0' => zero_pad = true,
                '+' | ' ' | '#' => {},
                _ => break,
            }
            chars.next();
        }

        let mut width = String::new();
        while let Some(digit) = chars.peek().copied() {
            if !digit.is_ascii_digit() {
                break;
            }
            width.push(digit);
            chars.next();
        }
        let width: usize = width.parse().unwrap_or(0);

        let mut precision = None;
        if chars.peek() == Some(&'.') {
            chars.next();
            let mut digits = String::new();
            while let Some(digit) = chars.peek().copied() {
                if !digit.is_ascii_digit() {
                    break;
                }
                digits.push(digit);
                chars.next();
            }
            precision = Some(digits.parse().unwrap_or(0));
        }

        let Some(verb) = chars.next() else {
            return Err(RuntimeError::InvalidFormat { message:
                                                         "format string ends after '%'"
                                                             .to_string(),
                                                     line });
        };

        if verb == '%' {
            out.push('%');
            continue;
        }

        let Some(arg) = args.get(next_arg) else {
            return Err(RuntimeError::InvalidFormat { message:
                                                         format!("missing argument for \
                                                                  '%{verb}'"),
                                                     line });
        };
        next_arg += 1;

        let rendered = render(verb, arg, precision, line)?;
        push_padded(&mut out, &rendered, width, left_align, zero_pad);
    }

    Ok(out)
}

fn render(verb: char, arg: &Value, precision: Option<usize>, line: usize)
          -> EvalResult<String> {
    match verb {
        'v' | 's' => Ok(arg.to_string()),
        '_' => Ok(arg.type_name().to_string()),
        't' => match arg {
            Value::Boolean(b) => Ok(b.to_string()),
            other => Err(verb_mismatch(verb, "bool", other, line)),
        },
        'd' | 'g' => match arg {
            Value::Number(n) => Ok(n.to_string()),
            other => Err(verb_mismatch(verb, "number", other, line)),
        },
        'f' => match arg {
            Value::Number(n) => {
                let digits = precision.unwrap_or(6);
                Ok(format!("{n:.digits$}"))
            },
            other => Err(verb_mismatch(verb, "number", other, line)),
        },
        other => Err(RuntimeError::InvalidFormat { message:
                                                       format!("unknown verb '%{other}'"),
                                                   line }),
    }
}

fn verb_mismatch(verb: char, expected: &str, got: &Value, line: usize) -> RuntimeError {
    RuntimeError::ArgumentType { position: format!("'%{verb}'"),
                                 method:   "printf".to_string(),
                                 expected: expected.to_string(),
                                 got:      got.type_name().to_string(),
                                 line }
}

fn push_padded(out: &mut String, rendered: &str, width: usize, left_align: bool, zero_pad: bool) {
    let padding = width.saturating_sub(rendered.chars().count());
    if padding == 0 {
        out.push_str(rendered);
        return;
    }
    if left_align {
        out.push_str(rendered);
        out.extend(std::iter::repeat_n(' ', padding));
    } else {
        out.extend(std::iter::repeat_n(if zero_pad { '0' } else { ' ' }, padding));
        out.push_str(rendered);
    }
}
