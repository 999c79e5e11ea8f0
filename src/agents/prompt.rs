//! Prompt assembly
//!
//! Pure string templating: the same context and question always produce the
//! same prompt.

/// Placed between retrieved chunks inside the context block.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

/// The only sentence the model may answer with when the context is silent.
pub const FALLBACK_ANSWER: &str =
    "Bu sorunun yanıtı mevcut belgelerde bulunmamaktadır. Lütfen avukatımızla iletişime geçin.";

pub const DISCLAIMER: &str =
    "Not: Bu yanıt yalnızca genel bilgilendirme amaçlıdır ve hukuki danışmanlık yerine geçmez.";

const EMPTY_CONTEXT: &str = "(Bağlam bulunamadı.)";

/// Embed retrieved chunks and the user's question into the fixed instruction template.
pub fn build_prompt(context: &[String], question: &str) -> String {
    let context = if context.is_empty() {
        EMPTY_CONTEXT.to_string()
    } else {
        context.join(CONTEXT_SEPARATOR)
    };

    format!(r#"Sen bir hukuk bürosunun web sitesindeki yardımcı asistansın. Soruları YALNIZCA aşağıdaki BAĞLAM bölümünde verilen belge parçalarına dayanarak yanıtla.

KURALLAR:
- Bağlamda yer almayan hiçbir bilgiyi kullanma, tahmin yürütme veya genel bilgiye başvurma.
- Yanıt bağlamda yoksa yalnızca şu cümleyi yaz: "{fallback}"
- Yanıtı Türkçe, açık ve kısa tut.
- Yanıtın sonuna her zaman şu notu ekle: "{disclaimer}"

BAĞLAM:
{context}

SORU: {question}

YANIT:"#,
        fallback = FALLBACK_ANSWER,
        disclaimer = DISCLAIMER,
        context = context,
        question = question.trim(),
    )
}
