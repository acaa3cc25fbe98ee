use insta::assert_snapshot;
use texcerpt::app::assemble::DocumentAssembler;
use texcerpt::app::build;
use texcerpt::app::scan::SectionScanner;
use texcerpt::app::selection::Selection;

const PAPER: &str = r#"\documentclass{article}
\begin{document}
\section{Introduction}
We study \textcolor{blue}{excerpts}.\newpage
\end{itemize}
\subsection{Results}
\begin{longtable}{cc}
\rowcolor{gray}a & b \\
\end{tabular}
\section{Appendix}
\includegraphics[width=3cm]{raw.png}
\end{figure}
\end{document}
"#;

#[test]
fn assembled_excerpt_renders() {
    let table = SectionScanner::new()
        .scan_text(PAPER)
        .expect("paper has sections");
    let selection = Selection::from_titles(["Results", "Introduction"]);
    let document = build::assemble_selection(&table, &selection, &DocumentAssembler::default())
        .expect("selection assembles");

    assert_eq!(document.titles, ["Introduction", "Results"]);
    assert_snapshot!(document.source.trim_end(), @r#"
\documentclass[12pt]{article}
\usepackage{amsmath}
\usepackage{amssymb}
\usepackage{longtable}
\usepackage{multirow}
\usepackage{geometry}
\usepackage{array}
\usepackage{tabularx}
\usepackage[table]{xcolor}
\usepackage{graphicx}
\usepackage{hyperref}
\title{}
\begin{document}
\section{Introduction}
We study excerpts.
\end{itemize}

\subsection{Results}
\begin{longtable}{cc}
a & b \\
\end{tabular}
\end{longtable}

\end{document}
"#);
}
