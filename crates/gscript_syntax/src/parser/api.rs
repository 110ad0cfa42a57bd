/// Parse a token sequence to completion.
///
/// This is the main public entrypoint for parsing; it drives a [`Parser`] until it finishes.
///
/// ## Parameters
/// - `tokens`: produced by `gscript_syntax::lexer`.
/// - `config`: parse target and language options.
///
/// ## Returns
/// The [`ParseOutput`]; `syntax` is `None` when a fatal error halted the session.
#[tracing::instrument(skip_all, fields(token_count = tokens.len()))]
pub fn parse(tokens: Vec<Token>, config: ParserConfig) -> ParseOutput {
    let mut parser = Parser::new(tokens, config);
    parser.run();
    parser.finish()
}

/// Lex `source` with the configured dialect, then parse it.
///
/// ## Errors
/// Returns the [`LexError`] when tokenization fails; the parser is not invoked in that case.
#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn parse_source(source: &str, config: ParserConfig) -> Result<ParseOutput, LexError> {
    let tokens = lex(source, &config.dialect)?;
    Ok(parse(tokens, config))
}
