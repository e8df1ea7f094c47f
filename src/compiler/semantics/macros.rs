//! Passes 2 and 3: macro substitution over every expression slot, then
//! expression analysis (free-variable extraction and the `$name.`
//! rewrite).  One shared traversal visits every `CExpr` in the model.

use log::debug;

use crate::compiler::ir::{CExpr, Dimension, FileSystem, Member, ObjectKind};
use crate::compiler::StringTable;

/// Pass 2: substitute every DEFINE macro into every expression.
pub(super) fn substitute_all(fs: &mut FileSystem) {
    let macros = fs.macros.clone();
    for (name, body) in &macros {
        debug!("substituting macro {}", name);
        for_each_expr(fs, &mut |e| e.substitute(name, body));
    }
}

/// Pass 3: analyze every expression.  Implicit-pointer location formulas
/// written against the containing object (the `container` keyword) are
/// rewritten to origin-relative form first and flagged.
pub(super) fn analyze_all(fs: &mut FileSystem, st: &StringTable) {
    for obj in &mut fs.objects {
        for m in &mut obj.fields {
            rewrite_pointer_exprs(m);
        }
    }
    for_each_expr(fs, &mut |e| e.analyze(st));
}

fn rewrite_pointer_exprs(m: &mut Member) {
    match m {
        Member::Field(f) => {
            for p in &mut f.pointers {
                if let Some(e) = &mut p.expr {
                    if e.rewrite_word("container", "0") {
                        p.relative = true;
                    }
                }
            }
        }
        Member::Nested(n) => {
            for m in &mut n.members {
                rewrite_pointer_exprs(m);
            }
        }
    }
}

fn for_each_expr(fs: &mut FileSystem, f: &mut dyn FnMut(&mut CExpr)) {
    for obj in &mut fs.objects {
        if let ObjectKind::Super { location } = &mut obj.kind {
            f(location);
        }
        opt(&mut obj.size, f);
        opt(&mut obj.when, f);
        for c in &mut obj.checks {
            f(c);
        }
        for m in &mut obj.fields {
            member(m, f);
        }
    }
    for c in &mut fs.containers {
        opt(&mut c.size, f);
        opt(&mut c.count, f);
        opt(&mut c.sentinel, f);
    }
    for a in &mut fs.addrspaces {
        f(&mut a.size);
        f(&mut a.null);
    }
}

fn member(m: &mut Member, f: &mut dyn FnMut(&mut CExpr)) {
    match m {
        Member::Field(fld) => {
            for d in &mut fld.dims {
                if let Dimension::Fixed(e) = d {
                    f(e);
                }
            }
            opt(&mut fld.when, f);
            opt(&mut fld.expr, f);
            opt(&mut fld.size, f);
            opt(&mut fld.count, f);
            opt(&mut fld.sentinel, f);
            for p in &mut fld.pointers {
                opt(&mut p.when, f);
                opt(&mut p.expr, f);
                opt(&mut p.size, f);
                opt(&mut p.count, f);
            }
        }
        Member::Nested(n) => {
            for d in &mut n.dims {
                if let Dimension::Fixed(e) = d {
                    f(e);
                }
            }
            opt(&mut n.when, f);
            for m in &mut n.members {
                member(m, f);
            }
        }
    }
}

fn opt(e: &mut Option<CExpr>, f: &mut dyn FnMut(&mut CExpr)) {
    if let Some(e) = e {
        f(e);
    }
}
