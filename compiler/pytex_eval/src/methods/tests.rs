#![allow(
    clippy::unwrap_used,
    reason = "test code uses unwrap for concise assertions"
)]

use pretty_assertions::assert_eq;

use crate::errors::{EvalError, ExceptionKind};
use crate::executor::capture_stdout;

fn run(source: &str) -> String {
    capture_stdout(source, None).unwrap()
}

fn fail(source: &str) -> EvalError {
    capture_stdout(source, None).unwrap_err()
}

#[test]
fn string_case_and_strip() {
    assert_eq!(
        run(r#"s = "  Hello World  "
print(s.strip(), s.lstrip(), s.rstrip(), sep="|")
print("abc".upper(), "ABC".lower(), "hello world".title(), "hELLO".capitalize())
print("xxhixx".strip("x"))"#),
        "Hello World|Hello World  |  Hello World\nABC abc Hello World Hello\nhi\n"
    );
}

#[test]
fn string_split_and_join() {
    assert_eq!(
        run(r#"print("a,b,,c".split(","))
print("  a  b c ".split())
print("a b c d".split(" ", 2))
print("a-b-c".split("-", maxsplit=1))
print("-".join(["x", "y", "z"]))
print("one\ntwo\r\nthree".splitlines())"#),
        "['a', 'b', '', 'c']\n['a', 'b', 'c']\n['a', 'b', 'c d']\n['a', 'b-c']\nx-y-z\n['one', 'two', 'three']\n"
    );
}

#[test]
fn string_search_and_replace() {
    assert_eq!(
        run(r#"s = "banana"
print(s.find("an"), s.find("x"), s.count("a"), s.count("an"))
print(s.replace("a", "o"), s.replace("a", "o", 1))
print(s.startswith("ba"), s.endswith(("x", "na")), "π=3".find("="))"#),
        "1 -1 3 2\nbonono bonana\nTrue True 1\n"
    );
}

#[test]
fn string_padding() {
    assert_eq!(
        run(r#"print("[" + "ab".center(6, "*") + "]")
print("[" + "ab".ljust(4) + "]", "[" + "ab".rjust(4, ".") + "]")
print("42".zfill(5), "-42".zfill(5), "abc".zfill(2))"#),
        "[**ab**]\n[ab  ] [..ab]\n00042 -0042 abc\n"
    );
}

#[test]
fn string_predicates_and_format() {
    assert_eq!(
        run(r#"print("123".isdigit(), "12a".isdigit(), "abc".isalpha(), "".isalpha())
print("{} + {} = {total}".format(1, 2, total=3))"#),
        "True False True False\n1 + 2 = 3\n"
    );
}

#[test]
fn join_rejects_non_strings() {
    let err = fail(r#"",".join([1, 2])"#);
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(
        err.message,
        "sequence item 0: expected str instance, int found"
    );
}

#[test]
fn list_mutation() {
    assert_eq!(
        run(r"xs = [3, 1, 2]
xs.append(4)
xs.extend([5, 6])
xs.insert(0, 0)
print(xs)
print(xs.pop(), xs.pop(0), xs)
xs.remove(1)
print(xs, xs.index(2), xs.count(2))
xs.reverse()
print(xs)
ys = xs.copy()
xs.clear()
print(xs, ys)"),
        "[0, 3, 1, 2, 4, 5, 6]\n6 0 [3, 1, 2, 4, 5]\n[3, 2, 4, 5] 1 1\n[5, 4, 2, 3]\n[] [5, 4, 2, 3]\n"
    );
}

#[test]
fn list_sort_is_stable_with_key_and_reverse() {
    assert_eq!(
        run(r#"words = ["pear", "fig", "apple", "kiwi"]
words.sort(key=len)
print(words)
words.sort(reverse=True)
print(words)
nums = [3, 1.5, 2]
nums.sort()
print(nums)"#),
        "['fig', 'pear', 'kiwi', 'apple']\n['pear', 'kiwi', 'fig', 'apple']\n[1.5, 2, 3]\n"
    );
}

#[test]
fn list_errors() {
    assert_eq!(fail("[].pop()").message, "pop from empty list");
    assert_eq!(fail("[1].pop(5)").message, "pop index out of range");
    assert_eq!(fail("[1].remove(2)").kind, ExceptionKind::ValueError);
    let err = fail("[1, 'a'].sort()");
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(
        err.message,
        "'<' not supported between instances of 'str' and 'int'"
    );
}

#[test]
fn dict_methods() {
    assert_eq!(
        run(r#"d = {"a": 1}
d["b"] = 2
print(d.keys(), d.values(), d.items())
print(d.get("a"), d.get("z"), d.get("z", 0))
print(d.setdefault("c", 3), d.setdefault("a", 9))
d.update({"a": 10}, e=5)
print(d)
print(d.pop("e"), d.pop("missing", None))
e = d.copy()
d.clear()
print(d, len(e))"#),
        "['a', 'b'] [1, 2] [('a', 1), ('b', 2)]\n1 None 0\n3 1\n{'a': 10, 'b': 2, 'c': 3, 'e': 5}\n5 None\n{} 3\n"
    );
}

#[test]
fn dict_pop_missing_is_key_error() {
    let err = fail(r#"{}.pop("k")"#);
    assert_eq!(err.kind, ExceptionKind::KeyError);
    assert_eq!(err.message, "'k'");
}

#[test]
fn stream_write_returns_length() {
    assert_eq!(
        run(r#"import sys
n = sys.stdout.write("héllo\n")
sys.stdout.flush()
print(n)"#),
        "héllo\n6\n"
    );
}

#[test]
fn unknown_method_is_attribute_error() {
    let err = fail(r#""x".nope()"#);
    assert_eq!(err.kind, ExceptionKind::AttributeError);
    assert_eq!(err.message, "'str' object has no attribute 'nope'");
}
