//! Line diff of two canonical encodings.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOp {
    Equal,
    Delete,
    Insert,
}

impl LineOp {
    fn prefix(self) -> &'static str {
        match self {
            LineOp::Equal => "  ",
            LineOp::Delete => "- ",
            LineOp::Insert => "+ ",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub op: LineOp,
    pub text: String,
}

/// Every line of both texts, tagged with how it got from one to the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiff {
    lines: Vec<DiffLine>,
}

impl LineDiff {
    pub fn new(old: &str, new: &str) -> Self {
        let src: Vec<&str> = old.lines().collect();
        let dst: Vec<&str> = new.lines().collect();
        let lines = diff(&src, &dst)
            .into_iter()
            .map(|(op, text)| DiffLine {
                op,
                text: text.to_string(),
            })
            .collect();
        Self { lines }
    }

    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    pub fn is_identical(&self) -> bool {
        self.lines.iter().all(|l| l.op == LineOp::Equal)
    }

    /// `(deleted, inserted)` line counts.
    pub fn stats(&self) -> (usize, usize) {
        self.lines.iter().fold((0, 0), |(del, ins), l| match l.op {
            LineOp::Equal => (del, ins),
            LineOp::Delete => (del + 1, ins),
            LineOp::Insert => (del, ins + 1),
        })
    }

    /// All lines with `"  "`, `"- "` or `"+ "` prefixes.
    pub fn to_ndiff(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line.op.prefix());
            out.push_str(&line.text);
            out.push('\n');
        }
        out
    }

    /// Changed regions only, each with up to `context` unchanged lines
    /// around it and a `@@ -a,b +c,d @@` header.
    pub fn to_context(&self, context: usize) -> String {
        let mut out = String::new();
        for (start, end) in self.hunks(context) {
            let before = &self.lines[..start];
            let hunk = &self.lines[start..end];
            let old_before = count(before, LineOp::Insert);
            let new_before = count(before, LineOp::Delete);
            let old_len = count(hunk, LineOp::Insert);
            let new_len = count(hunk, LineOp::Delete);
            out.push_str(&format!(
                "@@ -{},{} +{},{} @@\n",
                start_line(old_before, old_len),
                old_len,
                start_line(new_before, new_len),
                new_len
            ));
            for line in hunk {
                out.push_str(line.op.prefix());
                out.push_str(&line.text);
                out.push('\n');
            }
        }
        out
    }

    fn hunks(&self, context: usize) -> Vec<(usize, usize)> {
        let mut hunks: Vec<(usize, usize)> = Vec::new();
        for (idx, line) in self.lines.iter().enumerate() {
            if line.op == LineOp::Equal {
                continue;
            }
            let start = idx.saturating_sub(context);
            let end = (idx + context + 1).min(self.lines.len());
            match hunks.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => hunks.push((start, end)),
            }
        }
        hunks
    }
}

impl fmt::Display for LineDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ndiff())
    }
}

/// Lines on one side: everything except the other side's `skip` op.
fn count(lines: &[DiffLine], skip: LineOp) -> usize {
    lines.iter().filter(|l| l.op != skip).count()
}

fn start_line(before: usize, len: usize) -> usize {
    if len == 0 {
        before
    } else {
        before + 1
    }
}

/// LCS line diff. Common prefix and suffix are matched up front so the table
/// only covers the changed middle.
fn diff<'a>(src: &[&'a str], dst: &[&'a str]) -> Vec<(LineOp, &'a str)> {
    let prefix = src.iter().zip(dst).take_while(|(a, b)| a == b).count();
    let suffix = src[prefix..]
        .iter()
        .rev()
        .zip(dst[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();
    let a = &src[prefix..src.len() - suffix];
    let b = &dst[prefix..dst.len() - suffix];

    let mut out: Vec<(LineOp, &'a str)> = Vec::with_capacity(src.len().max(dst.len()));
    out.extend(src[..prefix].iter().map(|l| (LineOp::Equal, *l)));

    let n = a.len();
    let m = b.len();
    let mut dp = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            dp[i][j] = if a[i] == b[j] {
                1 + dp[i + 1][j + 1]
            } else {
                dp[i + 1][j].max(dp[i][j + 1])
            };
        }
    }
    let (mut i, mut j) = (0usize, 0usize);
    while i < n && j < m {
        if a[i] == b[j] {
            out.push((LineOp::Equal, a[i]));
            i += 1;
            j += 1;
        } else if dp[i + 1][j] >= dp[i][j + 1] {
            out.push((LineOp::Delete, a[i]));
            i += 1;
        } else {
            out.push((LineOp::Insert, b[j]));
            j += 1;
        }
    }
    out.extend(a[i..].iter().map(|l| (LineOp::Delete, *l)));
    out.extend(b[j..].iter().map(|l| (LineOp::Insert, *l)));

    out.extend(src[src.len() - suffix..].iter().map(|l| (LineOp::Equal, *l)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts() {
        let d = LineDiff::new("a\nb", "a\nb");
        assert!(d.is_identical());
        assert_eq!(d.to_ndiff(), "  a\n  b\n");
        assert_eq!(d.to_context(3), "");
    }

    #[test]
    fn replaced_line_is_delete_then_insert() {
        let d = LineDiff::new("a\nb\nc", "a\nx\nc");
        assert_eq!(d.to_ndiff(), "  a\n- b\n+ x\n  c\n");
        assert_eq!(d.stats(), (1, 1));
    }

    #[test]
    fn context_view_has_headers() {
        let old = "1\n2\n3\n4\n5\n6\n7\n8\n9";
        let new = "1\n2\n3\n4\nfive\n6\n7\n8\n9";
        let d = LineDiff::new(old, new);
        assert_eq!(d.to_context(1), "@@ -4,3 +4,3 @@\n  4\n- 5\n+ five\n  6\n");
    }

    #[test]
    fn nearby_changes_share_a_hunk() {
        let d = LineDiff::new("a\nb\nc\nd", "A\nb\nc\nD");
        assert_eq!(d.to_context(0).matches("@@ -").count(), 2);
        assert_eq!(d.to_context(1).matches("@@ -").count(), 1);
    }

    #[test]
    fn pure_insertion() {
        let d = LineDiff::new("", "a\nb");
        assert_eq!(d.to_ndiff(), "+ a\n+ b\n");
        assert_eq!(d.to_context(0), "@@ -0,0 +1,2 @@\n+ a\n+ b\n");
    }
}
