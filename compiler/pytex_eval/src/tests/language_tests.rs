#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use super::{fail, run};
use crate::ExceptionKind;

#[test]
fn arithmetic_follows_python_rules() {
    assert_eq!(
        run("print(7 // 2, -7 // 2, 7 % -3, -7 % 3, 7 / 2, 2 ** 10, 2 ** -1)"),
        "3 -4 -2 2 3.5 1024 0.5\n"
    );
    assert_eq!(
        run("print(-7.5 // 2, 7.5 % -2, 1 + 2.0, True + True, 10 / 5)"),
        "-4.0 -0.5 3.0 2 2.0\n"
    );
    assert_eq!(run("print(-2 ** 2, (-2) ** 2, 2 ** 3 ** 2)"), "-4 4 512\n");
    assert_eq!(run("print(1e20, 1 / 3, 0.1 + 0.2, 1e-7)"), "1e+20 0.3333333333333333 0.30000000000000004 1e-07\n");
}

#[test]
fn arithmetic_errors() {
    let err = fail("1 / 0");
    assert_eq!(err.kind, ExceptionKind::ZeroDivisionError);
    assert_eq!(err.message, "division by zero");
    assert_eq!(fail("5 // 0").message, "integer division or modulo by zero");
    assert_eq!(fail("5 % 0").message, "integer modulo by zero");
    assert_eq!(fail("1.0 / 0").message, "float division by zero");
    assert_eq!(fail("9223372036854775807 + 1").kind, ExceptionKind::OverflowError);
    let err = fail("'a' + 1");
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(err.message, "can only concatenate str (not \"int\") to str");
    assert_eq!(
        fail("[] - []").message,
        "unsupported operand type(s) for -: 'list' and 'list'"
    );
}

#[test]
fn sequences_and_strings() {
    assert_eq!(
        run(r#"s = "hello"
print(s[0], s[-1], s[1:3], s[::-1], s * 2, len(s))
xs = [1, 2, 3, 4, 5]
print(xs[1:], xs[:-2], xs[::2], xs[5:], xs[-100:2])
xs[1:3] = [9]
print(xs)
t = (1, 2) + (3,)
print(t, t[1:], 2 in t, 5 not in t)
print("ell" in s, [1, 2] == [1, 2], (1, 2) < (1, 3), "abc" < "abd")"#),
        "h o el olleh hellohello 5\n[2, 3, 4, 5] [1, 2, 3] [1, 3, 5] [] [1, 2]\n[1, 9, 4, 5]\n(1, 2, 3) (2, 3) True True\nTrue True True True\n"
    );
    let err = fail("[1, 2][5]");
    assert_eq!(err.kind, ExceptionKind::IndexError);
    assert_eq!(err.message, "list index out of range");
    assert_eq!(fail("'abc'[1:2:0]").message, "slice step cannot be zero");
}

#[test]
fn aliasing_is_visible_through_all_names() {
    assert_eq!(
        run("a = [1]\nb = a\nb.append(2)\nb += [3]\nprint(a, a is b)"),
        "[1, 2, 3] True\n"
    );
}

#[test]
fn control_flow() {
    assert_eq!(
        run(r"total = 0
for i in range(10):
    if i % 2 == 0:
        continue
    if i > 7:
        break
    total += i
else:
    print('not reached')
print(total)
n = 0
while n < 3:
    n += 1
else:
    print('done', n)
x = 5
print('big' if x > 3 else 'small')
if x < 0:
    print('neg')
elif x == 5:
    print('five')
else:
    print('other')"),
        "16\ndone 3\nbig\nfive\n"
    );
}

#[test]
fn unpacking_and_chained_assignment() {
    assert_eq!(
        run("a = b = 1\nx, y = 1, 2\nx, y = y, x\n(p, q), r = [3, 4], 5\nprint(a, b, x, y, p, q, r)"),
        "1 1 2 1 3 4 5\n"
    );
    assert_eq!(fail("a, b = 1, 2, 3").message, "too many values to unpack (expected 2)");
    assert_eq!(
        fail("a, b, c = [1]").message,
        "not enough values to unpack (expected 3, got 1)"
    );
}

#[test]
fn functions_defaults_keywords_and_closures() {
    assert_eq!(
        run(r"def greet(name, greeting='Hello'):
    return greeting + ', ' + name
print(greet('Ada'), greet('Bob', greeting='Hi'), greet(greeting='Yo', name='Cy'))
def make_counter():
    count = [0]
    def step():
        count[0] += 1
        return count[0]
    return step
c = make_counter()
c()
print(c(), c.__name__)
square = lambda v: v * v
print(square(7), (lambda: 'no args')())"),
        "Hello, Ada Hi, Bob Yo, Cy\n2 step\n49 no args\n"
    );
}

#[test]
fn call_errors() {
    let source = "def f(a, b):\n    pass\n";
    assert_eq!(
        fail(&format!("{source}f(1, 2, 3)")).message,
        "f() takes 2 positional arguments but 3 were given"
    );
    assert_eq!(
        fail(&format!("{source}f()")).message,
        "f() missing 2 required positional arguments: 'a' and 'b'"
    );
    assert_eq!(
        fail(&format!("{source}f(1, a=2)")).message,
        "f() got multiple values for argument 'a'"
    );
    assert_eq!(
        fail(&format!("{source}f(1, c=2)")).message,
        "f() got an unexpected keyword argument 'c'"
    );
    assert_eq!(fail("5()").message, "'int' object is not callable");
}

#[test]
fn recursion_works_until_the_limit() {
    assert_eq!(
        run("def fact(n):\n    return 1 if n <= 1 else n * fact(n - 1)\nprint(fact(20))"),
        "2432902008176640000\n"
    );
    let err = fail("def down(n):\n    return down(n + 1)\ndown(0)");
    assert_eq!(err.kind, ExceptionKind::RecursionError);
}

#[test]
fn comprehensions() {
    assert_eq!(
        run(r"print([x * x for x in range(5) if x % 2 == 0])
print([(i, c) for i in range(2) for c in 'ab'])
print(sum(x for x in range(4)))
x = 'outer'
[x for x in range(3)]
print(x)"),
        "[0, 4, 16]\n[(0, 'a'), (0, 'b'), (1, 'a'), (1, 'b')]\n6\nouter\n"
    );
}

#[test]
fn f_strings() {
    assert_eq!(
        run(r#"name = "pi"
value = 3.14159
width = 8
print(f"{name}={value:.2f}|{name!r}|{value:>{width}.3}|{{literal}}")
print(f"{1 + 1}{'x' * 3}{[1, 2]}")"#),
        "pi=3.14|'pi'|    3.14|{literal}\n2xxx[1, 2]\n"
    );
}

#[test]
fn try_except_else_finally() {
    assert_eq!(
        run(r"def check(v):
    try:
        r = 10 // v
    except ZeroDivisionError as e:
        print('caught', e)
        return -1
    else:
        print('ok')
        return r
    finally:
        print('finally')
print(check(2))
print(check(0))"),
        "ok\nfinally\n5\ncaught integer division or modulo by zero\nfinally\n-1\n"
    );
}

#[test]
fn exception_hierarchy_and_tuples_in_except() {
    assert_eq!(
        run(r"for source in [lambda: [][0], lambda: {}['k'], lambda: 1 / 0, lambda: int('x')]:
    try:
        source()
    except (LookupError, ArithmeticError) as e:
        print('lookup-or-arith', e)
    except Exception as e:
        print('other', e.args)"),
        "lookup-or-arith list index out of range\nlookup-or-arith 'k'\nlookup-or-arith division by zero\nother (\"invalid literal for int() with base 10: 'x'\",)\n"
    );
}

#[test]
fn raise_and_reraise() {
    assert_eq!(
        run(r"try:
    try:
        raise ValueError('inner')
    except ValueError:
        print('handling')
        raise
except ValueError as e:
    print('outer', e, e.args)"),
        "handling\nouter inner ('inner',)\n"
    );
    let err = fail("raise KeyError('k')");
    assert_eq!(err.kind, ExceptionKind::KeyError);
    assert_eq!(err.to_string(), "KeyError: 'k'");
    assert_eq!(fail("raise RuntimeError").to_string(), "RuntimeError");
    assert_eq!(
        fail("raise 5").message,
        "exceptions must derive from BaseException"
    );
    assert_eq!(fail("raise").message, "No active exception to reraise");
}

#[test]
fn except_name_is_cleared_after_handler() {
    let err = fail("try:\n    1/0\nexcept ZeroDivisionError as e:\n    pass\nprint(e)");
    assert_eq!(err.kind, ExceptionKind::NameError);
}

#[test]
fn assert_statement() {
    assert_eq!(run("assert 1 == 1, 'fine'"), "");
    let err = fail("assert 1 == 2, 'math is broken'");
    assert_eq!(err.kind, ExceptionKind::AssertionError);
    assert_eq!(err.message, "math is broken");
}

#[test]
fn dicts() {
    assert_eq!(
        run(r"d = {'a': 1, 'b': 2}
d['c'] = 3
d['a'] += 10
for k in d:
    print(k, d[k])
print(d, 'b' in d, len(d))
print({1: 'x', 1.0: 'y', True: 'z'})"),
        "a 11\nb 2\nc 3\n{'a': 11, 'b': 2, 'c': 3} True 3\n{1: 'z'}\n"
    );
    let err = fail("{}['missing']");
    assert_eq!(err.kind, ExceptionKind::KeyError);
    assert_eq!(err.message, "'missing'");
    assert_eq!(fail("{[1]: 2}").message, "unhashable type: 'list'");
}

#[test]
fn deep_expression_nesting_does_not_overflow() {
    let depth = 900;
    let source = format!("print({}1{})", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(run(&source), "1\n");

    let source = format!("print(0{})", " + 1".repeat(50_000));
    assert_eq!(run(&source), "50000\n");
}

#[test]
fn excessive_nesting_is_a_syntax_error() {
    let source = format!("print({}1)", "-".repeat(100_000));
    let err = fail(&source);
    assert_eq!(err.kind, ExceptionKind::SyntaxError);
    assert!(err.message.starts_with("too many nested expressions and blocks"));
}
