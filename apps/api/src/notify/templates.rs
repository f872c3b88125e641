//! Message bodies. Text and HTML variants carry the same content.

pub struct Email {
    pub subject: &'static str,
    pub text: String,
    pub html: String,
}

const STYLE: &str = "body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; } \
    .container { max-width: 600px; margin: 0 auto; padding: 20px; } \
    .header { background-color: #2563eb; color: white; padding: 20px; text-align: center; } \
    .content { background-color: #f8fafc; padding: 30px; } \
    .footer { text-align: center; margin-top: 20px; color: #64748b; font-size: 12px; }";

const FOOTER: &str = "Este es un correo automático, por favor no responda a este mensaje.";

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn wrap_html(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><meta charset='utf-8'><style>{STYLE}</style></head>\
         <body><div class='container'><div class='header'><h1>{title}</h1></div>\
         <div class='content'>{body}</div><div class='footer'><p>{FOOTER}</p></div></div>\
         </body></html>"
    )
}

pub fn welcome(full_name: &str) -> Email {
    let subject = "¡Bienvenido a TalentoPlus!";
    let text = format!(
        "{subject}\n\n\
         Estimado/a {full_name},\n\n\
         Tu registro en el sistema TalentoPlus ha sido completado exitosamente.\n\n\
         A través de este sistema podrás:\n\
         - Consultar tu información personal y laboral\n\
         - Descargar tu hoja de vida en formato PDF\n\
         - Mantener actualizada tu información de contacto\n\n\
         Si tienes alguna pregunta, contacta al departamento de Recursos Humanos.\n\n\
         El equipo de TalentoPlus\n\n---\n{FOOTER}\n"
    );
    let html = wrap_html(
        subject,
        &format!(
            "<p>Estimado/a <strong>{}</strong>,</p>\
             <p>Tu registro en el sistema TalentoPlus ha sido completado exitosamente.</p>\
             <p>A través de este sistema podrás:</p>\
             <ul><li>Consultar tu información personal y laboral</li>\
             <li>Descargar tu hoja de vida en formato PDF</li>\
             <li>Mantener actualizada tu información de contacto</li></ul>\
             <p>Si tienes alguna pregunta, contacta al departamento de Recursos Humanos.</p>\
             <p><strong>El equipo de TalentoPlus</strong></p>",
            html_escape(full_name)
        ),
    );
    Email { subject, text, html }
}

pub fn credentials(full_name: &str, email: &str, password: &str) -> Email {
    let subject = "Tus credenciales de acceso a TalentoPlus";
    let text = format!(
        "Estimado/a {full_name},\n\n\
         Se ha creado tu acceso al portal de empleados de TalentoPlus.\n\n\
         Usuario: {email}\n\
         Contraseña: {password}\n\n\
         Guarda esta información en un lugar seguro.\n\n\
         El equipo de TalentoPlus\n\n---\n{FOOTER}\n"
    );
    let html = wrap_html(
        subject,
        &format!(
            "<p>Estimado/a <strong>{}</strong>,</p>\
             <p>Se ha creado tu acceso al portal de empleados de TalentoPlus.</p>\
             <p>Usuario: <strong>{}</strong><br>Contraseña: <code>{}</code></p>\
             <p>Guarda esta información en un lugar seguro.</p>\
             <p><strong>El equipo de TalentoPlus</strong></p>",
            html_escape(full_name),
            html_escape(email),
            html_escape(password)
        ),
    );
    Email { subject, text, html }
}
