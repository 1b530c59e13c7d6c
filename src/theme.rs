/// Stylesheet for the whole app, injected once by the root component.
pub const APP_CSS: &str = r#"
:root {
    --color-bg-primary: #1e293b;
    --color-bg-sidebar: #0f172a;
    --color-bg-raised: #334155;
    --color-text-primary: #f1f5f9;
    --color-text-muted: #94a3b8;
    --color-border: #334155;
    --color-accent: #7c3aed;
    --color-accent-hover: #6d28d9;
    --color-chat-user-bg: #6d28d9;
    --color-chat-model-bg: #334155;
    --color-warning-bg: rgba(113, 63, 18, 0.2);
    --color-warning-text: #fde047;
    --color-shimmer-base: rgba(167, 139, 250, 0.25);
    --color-shimmer-highlight: #a78bfa;
}
* { box-sizing: border-box; }
html, body { margin: 0; height: 100%; }
body {
    background: var(--color-bg-primary);
    color: var(--color-text-primary);
    font-family: system-ui, -apple-system, "Segoe UI", sans-serif;
    font-size: 14px;
}
button { font: inherit; cursor: pointer; }
button:disabled { cursor: not-allowed; opacity: 0.5; }

.app { display: flex; height: 100vh; overflow: hidden; }

/* Sidebar */
.sidebar {
    width: 18rem; flex-shrink: 0; display: flex; flex-direction: column; gap: 0.5rem;
    padding: 0.5rem; background: var(--color-bg-sidebar); border-right: 1px solid var(--color-border);
}
.sidebar-brand { display: flex; align-items: center; gap: 0.5rem; padding: 0.5rem; font-size: 1.25rem; font-weight: 700; }
.sidebar-list { flex: 1; overflow-y: auto; display: flex; flex-direction: column; gap: 0.25rem; }
.sidebar-item {
    display: flex; align-items: center; justify-content: space-between; gap: 0.5rem;
    padding: 0.5rem 0.75rem; border-radius: 0.375rem; color: var(--color-text-muted);
}
.sidebar-item:hover { background: rgba(51, 65, 85, 0.5); color: var(--color-text-primary); }
.sidebar-item.active { background: var(--color-bg-raised); color: var(--color-text-primary); }
.sidebar-item-text { display: flex; flex-direction: column; min-width: 0; }
.sidebar-item-title { overflow: hidden; white-space: nowrap; text-overflow: ellipsis; }
.sidebar-item-date { font-size: 0.7rem; color: var(--color-text-muted); }
.sidebar-delete { background: none; border: none; color: var(--color-text-muted); opacity: 0; }
.sidebar-item:hover .sidebar-delete { opacity: 1; }
.sidebar-delete:hover { color: #f87171; }
.sidebar-footer { padding: 0.5rem; font-size: 0.75rem; text-align: center; color: var(--color-text-muted); }

.btn {
    border: none; border-radius: 0.5rem; padding: 0.5rem 1rem;
    background: var(--color-bg-raised); color: var(--color-text-primary);
}
.btn-primary { background: var(--color-accent); font-weight: 600; }
.btn-primary:hover { background: var(--color-accent-hover); }
.btn-ghost { background: none; border: none; color: var(--color-text-muted); padding: 0.25rem 0.5rem; }
.btn-ghost:hover { color: var(--color-text-primary); }

/* Chat */
.chat-view { flex: 1; display: flex; flex-direction: column; min-width: 0; }
.chat-list { flex: 1; overflow-y: auto; padding: 1.5rem; }
.chat-inner { max-width: 56rem; margin: 0 auto; display: flex; flex-direction: column; gap: 1.5rem; }
.start-screen { height: 100%; display: flex; flex-direction: column; align-items: center; justify-content: center; text-align: center; }
.start-screen h2 { font-size: 1.75rem; margin: 0.5rem 0; }
.start-screen p { color: var(--color-text-muted); max-width: 32rem; }
.start-examples { margin-top: 1.5rem; text-align: left; padding: 1rem 1.5rem; border: 1px solid var(--color-border); border-radius: 0.5rem; }

.message-row { display: flex; align-items: flex-start; gap: 1rem; }
.message-row.user { justify-content: flex-end; }
.avatar {
    width: 2rem; height: 2rem; flex-shrink: 0; border-radius: 50%;
    display: flex; align-items: center; justify-content: center; font-weight: 700;
    background: var(--color-bg-raised);
}
.avatar.model { background: var(--color-accent); }
.message-stack { max-width: 42rem; width: 100%; display: flex; flex-direction: column; }
.message-row.user .message-stack { align-items: flex-end; }
.bubble { border-radius: 1rem; padding: 0.75rem 1rem; overflow-wrap: anywhere; }
.bubble.user { background: var(--color-chat-user-bg); border-bottom-right-radius: 0; white-space: pre-wrap; }
.bubble.model { background: var(--color-chat-model-bg); border-bottom-left-radius: 0; }
.bubble img { border-radius: 0.5rem; max-width: 100%; height: auto; }
.bubble .attachment-image { max-width: 20rem; margin-bottom: 0.5rem; }
.message-actions { margin-top: 0.5rem; display: flex; gap: 0.5rem; font-size: 0.75rem; }
.message-status { margin-top: 0.25rem; font-size: 0.75rem; color: var(--color-text-muted); }

.shimmer-text {
    background: linear-gradient(90deg, var(--color-shimmer-base), var(--color-shimmer-highlight), var(--color-shimmer-base));
    background-size: 200% 100%;
    -webkit-background-clip: text; background-clip: text; color: transparent;
    animation: shimmer 1.6s linear infinite;
}
@keyframes shimmer { from { background-position: 200% 0; } to { background-position: -200% 0; } }

.code-block { margin-top: 1rem; border: 1px solid #475569; border-radius: 0.5rem; overflow: hidden; background: #0f172a; }
.code-header {
    display: flex; justify-content: space-between; align-items: center;
    padding: 0.5rem 1rem; background: #1e293b; font-size: 0.75rem; color: var(--color-text-muted);
}
.code-body { padding: 1rem; overflow-x: auto; font-size: 0.85rem; }
.code-body pre { margin: 0; }
.code-warning { padding: 1rem; font-size: 0.75rem; border-top: 1px solid rgba(202, 138, 4, 0.5); background: var(--color-warning-bg); color: var(--color-warning-text); }

/* Composer */
.composer { padding: 1.5rem; border-top: 1px solid var(--color-border); }
.composer-inner { max-width: 56rem; margin: 0 auto; }
.mode-buttons { display: grid; grid-template-columns: repeat(4, 1fr); gap: 0.5rem; margin-bottom: 0.75rem; }
.mode-button { border: none; border-radius: 0.5rem; padding: 0.5rem; background: var(--color-bg-raised); color: var(--color-text-muted); }
.mode-button.active { background: var(--color-accent); color: #fff; }
.attachment-chip {
    margin-bottom: 0.5rem; padding: 0.5rem; border-radius: 0.5rem; background: var(--color-bg-raised);
    display: flex; align-items: center; justify-content: space-between; gap: 0.5rem;
}
.attachment-chip img { width: 2.5rem; height: 2.5rem; border-radius: 0.375rem; object-fit: cover; }
.composer-row { display: flex; align-items: flex-end; gap: 0.5rem; padding: 0.5rem; border-radius: 0.75rem; background: var(--color-bg-raised); }
.composer-row textarea {
    flex: 1; resize: none; max-height: 200px; border: none; outline: none;
    background: transparent; color: var(--color-text-primary); padding: 0.5rem; font: inherit;
}
.attach-label { padding: 0.5rem; color: var(--color-text-muted); cursor: pointer; }
.attach-label input { display: none; }

/* Preview */
.preview-panel {
    width: 50%; flex-shrink: 0; display: flex; flex-direction: column;
    border-left: 1px solid var(--color-border); background: var(--color-bg-primary);
}
.preview-header {
    display: flex; align-items: center; justify-content: space-between; padding: 0.75rem;
    background: var(--color-bg-sidebar); border-bottom: 1px solid var(--color-border);
}
.preview-header h3 { margin: 0; font-size: 1rem; }
.preview-actions { display: flex; gap: 0.5rem; align-items: center; }
.preview-body { flex: 1; overflow: auto; }
.preview-body iframe { width: 100%; height: 100%; border: none; background: #fff; }
.preview-document { padding: 1.5rem; }
.export-status { font-size: 0.75rem; color: var(--color-text-muted); }

.md pre { white-space: pre-wrap; }
.md table { border-collapse: collapse; }
.md th, .md td { border: 1px solid var(--color-border); padding: 0.25rem 0.5rem; }

/* Printing (PDF export) covers the document preview only. */
@media print {
    html, body { height: auto; background: #fff; color: #000; }
    .sidebar, .chat-view, .preview-header { display: none !important; }
    .app { display: block; height: auto; overflow: visible; }
    .preview-panel { width: 100%; border: none; background: #fff; }
    .preview-body { overflow: visible; }
    .preview-document { padding: 0; color: #000; }
    .preview-document pre { background: none; }
}
"#;
