use super::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("cannot assign to {0}")]
    InvalidAssignmentTarget(Expr),
}

pub fn evaluate(expr: &Expr, env: &mut Environment) -> Result<f64, Error> {
    Interpreter::new(env).expression(expr)
}

/// Variable values that outlive a single evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Environment {
    variables: BTreeMap<Name, f64>,
}

impl Environment {
    pub fn new() -> Environment {
        Environment {
            variables: BTreeMap::new(),
        }
    }

    pub fn get(&self, name: &Name) -> Option<f64> {
        self.variables.get(name).cloned()
    }

    /// Reading an unset variable yields NaN rather than an error.
    pub fn lookup(&self, name: &Name) -> f64 {
        self.get(name).unwrap_or(f64::NAN)
    }

    pub fn assign(&mut self, name: Name, value: f64) {
        self.variables.insert(name, value);
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'_ Name, f64)> + '_ {
        self.variables.iter().map(|(name, value)| (name, *value))
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{{{}}}",
            self.iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

pub struct Interpreter<'a> {
    env: &'a mut Environment,
}

impl<'a> Interpreter<'a> {
    pub fn new(env: &'a mut Environment) -> Interpreter<'a> {
        Interpreter { env }
    }

    pub fn expression(&mut self, expr: &Expr) -> Result<f64, Error> {
        match *expr {
            Expr::Literal(value) => Ok(value),
            Expr::Variable(ref name) => Ok(self.env.lookup(name)),
            Expr::Operation(operator, ref left, ref right) => match arithmetic(operator) {
                Some(apply) => self.operation(apply, left, right),
                None => self.assign(left, right),
            },
        }
    }

    fn operation(
        &mut self,
        apply: fn(f64, f64) -> f64,
        left: &Expr,
        right: &Expr,
    ) -> Result<f64, Error> {
        // Left first: an assignment on the left is visible to the right.
        let l = self.expression(left)?;
        let r = self.expression(right)?;
        Ok(apply(l, r))
    }

    fn assign(&mut self, target: &Expr, value: &Expr) -> Result<f64, Error> {
        let name = match *target {
            Expr::Variable(ref name) => name,
            _ => return Err(Error::InvalidAssignmentTarget(target.clone())),
        };
        let value = self.expression(value)?;
        self.env.assign(name.clone(), value);
        Ok(value)
    }
}

// Every operator but `Assign` combines two evaluated operands.
fn arithmetic(operator: Operator) -> Option<fn(f64, f64) -> f64> {
    let apply: fn(f64, f64) -> f64 = match operator {
        Operator::Add => |l, r| l + r,
        Operator::Sub => |l, r| l - r,
        Operator::Mul => |l, r| l * r,
        Operator::Div => |l, r| l / r,
        Operator::Pow => pow,
        Operator::Mod => |l, r| l % r,
        Operator::Assign => return None,
    };
    Some(apply)
}

// `powf` maps 1^NaN and 1^inf to 1; keep NaN flowing from an unset exponent.
fn pow(base: f64, exponent: f64) -> f64 {
    if base.abs() == 1.0 && !exponent.is_finite() {
        f64::NAN
    } else {
        base.powf(exponent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::parser::{parse_with, NoTrace};
    use super::super::tokenizer::tokenize;
    use quickcheck::{Gen, QuickCheck};

    fn eval(s: &str, env: &mut Environment) -> f64 {
        let expr = parse_with(&tokenize(s), &mut NoTrace).unwrap();
        evaluate(&expr, env).unwrap()
    }

    fn as_name(s: &str) -> Name {
        Name(s.to_string())
    }

    #[test]
    fn assignment_returns_the_value() {
        let mut env = Environment::new();
        assert_eq!(eval("(abc = 42)", &mut env), 42.0);
        assert_eq!(env.get(&as_name("abc")), Some(42.0));
    }

    #[test]
    fn nested_arithmetic() {
        let mut env = Environment::new();
        env.assign(as_name("abc"), 42.0);
        assert_eq!(
            eval("(ans = (24 + (abc * ((16 / 2) - 5))))", &mut env),
            150.0
        );
        assert_eq!(env.get(&as_name("ans")), Some(150.0));
    }

    #[test]
    fn reading_has_no_side_effect() {
        let mut env = Environment::new();
        eval("(abc = 42)", &mut env);
        let before = env.clone();
        assert_eq!(eval("abc", &mut env), 42.0);
        assert_eq!(env, before);
    }

    #[test]
    fn var_can_be_redefined_using_itself() {
        let mut env = Environment::new();
        eval("(a = 2)", &mut env);
        eval("(a = (a * 5))", &mut env);
        assert_eq!(env.get(&as_name("a")), Some(10.0));
    }

    #[test]
    fn unset_variable_is_poison() {
        let mut env = Environment::new();
        assert!(eval("(x = y)", &mut env).is_nan());
        assert!(env.get(&as_name("x")).unwrap().is_nan());
        assert_eq!(env.get(&as_name("y")), None);
        assert!(eval("(x + 1)", &mut env).is_nan());
        assert!(eval("(1 ^ y)", &mut env).is_nan());
    }

    #[test]
    fn basic_arithmetic() {
        let mut env = Environment::new();
        assert_eq!(eval("(1 + 2)", &mut env), 3.0);
        assert_eq!(eval("(1 - 2)", &mut env), -1.0);
        assert_eq!(eval("(3 * 2.5)", &mut env), 7.5);
        assert_eq!(eval("(7 / 2)", &mut env), 3.5);
        assert_eq!(eval("(2 ^ 10)", &mut env), 1024.0);
        assert_eq!(eval("(2 ^ (0 - 1))", &mut env), 0.5);
        assert_eq!(eval("(7 % 3)", &mut env), 1.0);
        assert_eq!(eval("(7.5 % 2)", &mut env), 1.5);
    }

    #[test]
    fn remainder_sign_follows_dividend() {
        let mut env = Environment::new();
        assert_eq!(eval("((0 - 7) % 3)", &mut env), -1.0);
        assert_eq!(eval("(7 % (0 - 3))", &mut env), 1.0);
    }

    #[test]
    fn division_by_zero() {
        let mut env = Environment::new();
        assert_eq!(eval("(1 / 0)", &mut env), f64::INFINITY);
        assert_eq!(eval("((0 - 1) / 0)", &mut env), f64::NEG_INFINITY);
        assert!(eval("(0 / 0)", &mut env).is_nan());
        assert!(eval("(1 % 0)", &mut env).is_nan());
    }

    #[test]
    fn left_is_evaluated_before_right() {
        let mut env = Environment::new();
        assert_eq!(eval("((a = 3) + (a * 2))", &mut env), 9.0);
        assert_eq!(eval("((b = (c = 4)) - c)", &mut env), 0.0);
        assert_eq!(env.get(&as_name("b")), Some(4.0));
        assert_eq!(env.get(&as_name("c")), Some(4.0));
    }

    #[test]
    fn hand_built_assignment_to_literal_errors() {
        let mut env = Environment::new();
        let expr = Expr::operation(Operator::Assign, Expr::Literal(1.0), Expr::Literal(2.0));
        assert_eq!(
            evaluate(&expr, &mut env),
            Err(Error::InvalidAssignmentTarget(Expr::Literal(1.0)))
        );
        assert!(env.is_empty());
    }

    #[test]
    fn assign_is_the_only_non_arithmetic_operator() {
        for &operator in &[
            Operator::Add,
            Operator::Sub,
            Operator::Mul,
            Operator::Div,
            Operator::Pow,
            Operator::Mod,
        ] {
            assert!(arithmetic(operator).is_some(), "{}", operator.name());
        }
        assert!(arithmetic(Operator::Assign).is_none());
    }

    #[test]
    fn hand_built_nested_assignment_errors() {
        let mut env = Environment::new();
        let bad = Expr::operation(Operator::Assign, Expr::Literal(1.0), Expr::Literal(2.0));
        let expr = Expr::operation(Operator::Add, Expr::Literal(3.0), bad);
        assert_eq!(
            evaluate(&expr, &mut env),
            Err(Error::InvalidAssignmentTarget(Expr::Literal(1.0)))
        );
        assert!(env.is_empty());
    }

    #[test]
    fn environment_dump() {
        let mut env = Environment::new();
        assert_eq!(format!("{}", env), "{}");
        eval("(zed = 1.5)", &mut env);
        eval("(abc = 42)", &mut env);
        assert_eq!(format!("{}", env), "{abc: 42, zed: 1.5}");
        assert_eq!(env.len(), 2);
    }

    fn evaluates_successfully_prop(expr: Expr) -> bool {
        let mut env = Environment::new();
        evaluate(&expr, &mut env).is_ok()
    }

    #[test]
    fn evaluates_successfully() {
        // Parsed trees never hold a bad assignment target, so evaluation
        // cannot fail.
        for size in 1..11 {
            let mut qc = QuickCheck::new().gen(Gen::new(size));
            qc.quickcheck(evaluates_successfully_prop as fn(Expr) -> bool);
        }
    }
}
